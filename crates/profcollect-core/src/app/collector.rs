//! Collector - 1 回分のバッチ（fetch → store → retention）
//!
//! # フロー
//! 1. エンドポイントごとに ProfileFetcher::fetch()
//! 2. 成功したら RetentionStore::store()（作成 + retention）
//! 3. 失敗はログに出して次のエンドポイントへ（バッチは止めない）
//!
//! 既定は逐次実行。`concurrency > 1` のときは取得を並行させるが、
//! 同じ group の作成と retention は RetentionStore 側で直列化される。

use std::time::Instant;

use futures::stream::{self, StreamExt};

use super::config::CollectorConfig;
use super::report::RunReport;
use super::retention_store::{EvictionReport, RetentionStore};
use crate::domain::EndpointSpec;
use crate::ports::{ArtifactStore, ProfileFetcher};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 締め切りまでに終わらなかった（`partial` はそれまでの集計）
    #[error(
        "run deadline of {deadline:?} exceeded after storing {} of {} profiles",
        partial.stored,
        partial.endpoints
    )]
    DeadlineExceeded {
        deadline: std::time::Duration,
        partial: RunReport,
    },
}

/// エンドポイント 1 件の処理結果
#[derive(Debug)]
enum EndpointOutcome {
    Stored(EvictionReport),
    FetchFailed,
    StoreFailed,
}

pub struct Collector<F, S> {
    config: CollectorConfig,
    fetcher: F,
    store: RetentionStore<S>,
}

impl<F: ProfileFetcher, S: ArtifactStore> Collector<F, S> {
    pub fn new(config: CollectorConfig, fetcher: F, store: S) -> Self {
        let store = RetentionStore::new(store, config.retention());
        Self {
            config,
            fetcher,
            store,
        }
    }

    pub fn store(&self) -> &RetentionStore<S> {
        &self.store
    }

    /// バッチを実行（全体の締め切りを超えたら RunError）
    ///
    /// 結果は完了した順に集計するので、締め切り超過時もそこまでの件数が残る。
    pub async fn run(&self, endpoints: &[EndpointSpec]) -> Result<RunReport, RunError> {
        let deadline = self.config.run_timeout();
        let started = Instant::now();
        tracing::info!(
            endpoints = endpoints.len(),
            namespace = self.config.namespace(),
            retention = self.config.retention().get(),
            concurrency = self.config.concurrency().get(),
            "collecting profiles"
        );

        let mut report = RunReport {
            endpoints: endpoints.len(),
            ..RunReport::default()
        };
        let finished = tokio::time::timeout(deadline, self.run_batch(endpoints, &mut report))
            .await
            .is_ok();

        if !finished {
            tracing::error!(
                deadline_secs = deadline.as_secs(),
                stored = report.stored,
                fetch_failed = report.fetch_failed,
                store_failed = report.store_failed,
                evicted = report.evicted,
                eviction_failed = report.eviction_failed,
                "run deadline exceeded"
            );
            return Err(RunError::DeadlineExceeded {
                deadline,
                partial: report,
            });
        }

        tracing::info!(
            stored = report.stored,
            fetch_failed = report.fetch_failed,
            store_failed = report.store_failed,
            evicted = report.evicted,
            eviction_failed = report.eviction_failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection finished"
        );
        Ok(report)
    }

    async fn run_batch(&self, endpoints: &[EndpointSpec], report: &mut RunReport) {
        let mut outcomes = stream::iter(endpoints)
            .map(|endpoint| self.collect_one(endpoint))
            .buffer_unordered(self.config.concurrency().get());

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                EndpointOutcome::Stored(eviction) => {
                    report.stored += 1;
                    report.evicted += eviction.evicted.len();
                    report.eviction_failed += eviction.failure_count();
                }
                EndpointOutcome::FetchFailed => report.fetch_failed += 1,
                EndpointOutcome::StoreFailed => report.store_failed += 1,
            }
        }
    }

    async fn collect_one(&self, endpoint: &EndpointSpec) -> EndpointOutcome {
        let group = endpoint.group();
        let profile = match self.fetcher.fetch(endpoint).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(group, url = %endpoint.url(), error = %e, "fetching profile");
                return EndpointOutcome::FetchFailed;
            }
        };
        tracing::debug!(
            group,
            url = %endpoint.url(),
            bytes = profile.payload.len(),
            fetched_at = %profile.fetched_at,
            "fetched profile"
        );

        match self
            .store
            .store(group, self.config.namespace(), profile.payload)
            .await
        {
            Ok(stored) => EndpointOutcome::Stored(stored.eviction),
            Err(e) => {
                tracing::error!(group, url = %endpoint.url(), error = %e, "storing profile");
                EndpointOutcome::StoreFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchCause, FetchError, NewArtifact, Profile, RetentionBound};
    use crate::impls::InMemoryArtifactStore;
    use crate::ports::{Clock, FixedClock};
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// URL ごとに成功・失敗を決めるフェイク
    #[derive(Default)]
    struct FakeFetcher {
        failing: HashSet<String>,
        hang: HashSet<String>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeFetcher {
        fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(|u| u.to_string()).collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProfileFetcher for FakeFetcher {
        async fn fetch(&self, endpoint: &EndpointSpec) -> Result<Profile, FetchError> {
            let url = endpoint.url().to_string();
            self.calls.lock().unwrap().push(url.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if self.hang.contains(&url) {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&url) {
                return Err(FetchError {
                    group: endpoint.group().to_string(),
                    url: endpoint.url().clone(),
                    cause: FetchCause::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
                });
            }
            Ok(Profile {
                group: endpoint.group().to_string(),
                payload: Bytes::from(format!("profile from {url}")),
                fetched_at: Utc::now(),
            })
        }
    }

    const A: &str = "a:https://x/debug/pprof/heap";
    const B: &str = "b:https://y/debug/pprof/heap";

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    fn config(retention: i64) -> CollectorConfig {
        CollectorConfig::new("ns", RetentionBound::new(retention).unwrap()).unwrap()
    }

    fn endpoints(raw: &[&str]) -> Vec<EndpointSpec> {
        EndpointSpec::parse_all(raw).unwrap()
    }

    #[tokio::test]
    async fn stores_one_artifact_per_endpoint() {
        let collector = Collector::new(
            config(2),
            FakeFetcher::default(),
            InMemoryArtifactStore::new(clock()),
        );

        let report = collector.run(&endpoints(&[A, B])).await.unwrap();

        assert_eq!(
            report,
            RunReport {
                endpoints: 2,
                stored: 2,
                ..RunReport::default()
            }
        );
        let store = collector.store().inner();
        let a = store.artifacts("ns", "a").await;
        let b = store.artifacts("ns", "b").await;
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].payload, Bytes::from("profile from https://x/debug/pprof/heap"));
    }

    #[tokio::test]
    async fn evicts_oldest_prior_artifact_at_bound() {
        let clock = clock();
        let store = InMemoryArtifactStore::new(clock.clone());
        let mut prior = Vec::new();
        for _ in 0..2 {
            let a = store
                .create(NewArtifact::new("a", "ns", Bytes::new()))
                .await
                .unwrap();
            prior.push(a.id);
            clock.advance(Duration::minutes(15));
        }
        let collector = Collector::new(config(2), FakeFetcher::default(), store);

        let report = collector.run(&endpoints(&[A, B])).await.unwrap();

        assert_eq!(report.stored, 2);
        assert_eq!(report.evicted, 1);
        let a: Vec<_> = collector
            .store()
            .inner()
            .artifacts("ns", "a")
            .await
            .into_iter()
            .map(|a| (a.id, a.created_at))
            .collect();
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].0, prior[1]);
        assert_eq!(a[1].1, clock.now());
        assert!(a.iter().all(|(id, _)| id != &prior[0]));
        assert_eq!(collector.store().inner().artifacts("ns", "b").await.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_does_not_stop_the_batch() {
        let fetcher = FakeFetcher::failing(&["https://x/debug/pprof/heap"]);
        let collector = Collector::new(config(2), fetcher, InMemoryArtifactStore::new(clock()));

        let report = collector.run(&endpoints(&[A, B])).await.unwrap();

        assert_eq!(report.fetch_failed, 1);
        assert_eq!(report.stored, 1);
        assert!(collector.store().inner().artifacts("ns", "a").await.is_empty());
        assert_eq!(collector.store().inner().artifacts("ns", "b").await.len(), 1);
    }

    #[tokio::test]
    async fn create_failure_does_not_stop_the_batch() {
        // namespace が存在しないので create はすべて失敗する
        let store = InMemoryArtifactStore::new(clock()).with_namespaces(["other"]);
        let collector = Collector::new(config(1), FakeFetcher::default(), store);

        let report = collector.run(&endpoints(&[A, B])).await.unwrap();

        assert_eq!(report.store_failed, 2);
        assert_eq!(report.evicted, 0);
        assert_eq!(report.eviction_failed, 0);
        assert_eq!(collector.fetcher.calls().len(), 2);
        assert!(collector.store().inner().is_empty().await);
    }

    #[tokio::test]
    async fn sequential_by_default_in_argument_order() {
        let collector = Collector::new(
            config(2),
            FakeFetcher::default(),
            InMemoryArtifactStore::new(clock()),
        );

        collector.run(&endpoints(&[B, A])).await.unwrap();

        assert_eq!(collector.fetcher.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(
            collector.fetcher.calls(),
            vec!["https://y/debug/pprof/heap", "https://x/debug/pprof/heap"]
        );
    }

    #[tokio::test]
    async fn concurrent_run_keeps_retention_per_group() {
        let raw: Vec<String> = (0..6)
            .map(|i| format!("heap:https://replica-{i}/debug/pprof/heap"))
            .collect();
        let specs = EndpointSpec::parse_all(&raw).unwrap();
        let config = config(2).with_concurrency(std::num::NonZeroUsize::new(3).unwrap());
        let collector = Collector::new(
            config,
            FakeFetcher::default(),
            InMemoryArtifactStore::new(crate::ports::SystemClock),
        );

        let report = collector.run(&specs).await.unwrap();

        assert_eq!(report.stored, 6);
        assert_eq!(report.evicted, 4);
        assert!(collector.fetcher.max_in_flight.load(Ordering::SeqCst) > 1);
        assert_eq!(collector.store().inner().artifacts("ns", "heap").await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_endpoint_hits_run_deadline_with_partial_counts() {
        let fetcher = FakeFetcher {
            hang: HashSet::from(["https://x/debug/pprof/heap".to_string()]),
            ..FakeFetcher::default()
        };
        let config = config(2)
            .with_run_timeout(std::time::Duration::from_secs(60))
            .unwrap();
        let collector = Collector::new(config, fetcher, InMemoryArtifactStore::new(clock()));

        // b は完了し、a で止まる
        let err = collector.run(&endpoints(&[B, A])).await.unwrap_err();

        let RunError::DeadlineExceeded { deadline, partial } = err;
        assert_eq!(deadline, std::time::Duration::from_secs(60));
        assert_eq!(
            partial,
            RunReport {
                endpoints: 2,
                stored: 1,
                ..RunReport::default()
            }
        );
        assert_eq!(collector.store().inner().artifacts("ns", "b").await.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_clean_noop() {
        let collector = Collector::new(
            config(2),
            FakeFetcher::default(),
            InMemoryArtifactStore::new(clock()),
        );
        let report = collector.run(&[]).await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.endpoints, 0);
    }
}
