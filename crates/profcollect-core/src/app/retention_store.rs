//! RetentionStore - 作成と retention をまとめて行うストア
//!
//! # フロー
//! 1. (namespace, group) のロックを取る
//! 2. ArtifactStore::create() で immutable な Artifact を作成
//! 3. 同じ group の Artifact を list し、古いものを delete（上限 `bound` 件）
//!
//! # 設計原則
//! - create の失敗は retention を起動しない（何も作っていない）
//! - list / delete の失敗はログに出すだけで、作成済みの Artifact は巻き戻さない
//! - delete は 1 件ずつ試み、途中で失敗しても残りを続ける
//! - 同じ group への create+retention は直列化する（並行実行時に上限を超えない）

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::domain::{
    Artifact, ArtifactId, NewArtifact, RetentionBound, StoreError, select_evictions,
};
use crate::ports::ArtifactStore;

/// retention の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub evicted: Vec<ArtifactId>,
    pub failed: Vec<ArtifactId>,
    /// list に失敗して retention 自体を行えなかった
    pub list_failed: bool,
}

impl EvictionReport {
    pub fn failure_count(&self) -> usize {
        self.failed.len() + usize::from(self.list_failed)
    }
}

/// store() の結果
#[derive(Debug, Clone)]
pub struct Stored {
    pub artifact: Artifact,
    pub eviction: EvictionReport,
}

type GroupKey = (String, String);

pub struct RetentionStore<S> {
    store: S,
    bound: RetentionBound,
    locks: Mutex<HashMap<GroupKey, Arc<Mutex<()>>>>,
}

impl<S: ArtifactStore> RetentionStore<S> {
    pub fn new(store: S, bound: RetentionBound) -> Self {
        Self {
            store,
            bound,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// 内側の ArtifactStore
    pub fn inner(&self) -> &S {
        &self.store
    }

    async fn group_lock(&self, namespace: &str, group: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((namespace.to_string(), group.to_string()))
            .or_default()
            .clone()
    }

    /// payload を保存し、その group の retention を実施
    pub async fn store(
        &self,
        group: &str,
        namespace: &str,
        payload: Bytes,
    ) -> Result<Stored, StoreError> {
        let lock = self.group_lock(namespace, group).await;
        let _guard = lock.lock().await;

        let artifact = self
            .store
            .create(NewArtifact::new(group, namespace, payload))
            .await?;
        tracing::info!(
            group,
            namespace,
            artifact = %artifact.id,
            bytes = artifact.payload.len(),
            "stored profile"
        );

        let eviction = self
            .enforce_retention(namespace, group, Some(&artifact.id))
            .await;
        Ok(Stored { artifact, eviction })
    }

    /// group の Artifact を上限 `bound` 件まで削減
    ///
    /// 呼び出し側で group のロックを保持していること（`store` 経由なら保持済み）。
    pub async fn enforce_retention(
        &self,
        namespace: &str,
        group: &str,
        fresh: Option<&ArtifactId>,
    ) -> EvictionReport {
        let mut report = EvictionReport::default();

        let live = match self.store.list(namespace, group).await {
            Ok(live) => live,
            Err(e) => {
                tracing::error!(group, namespace, error = %e, "listing artifacts for retention");
                report.list_failed = true;
                return report;
            }
        };

        for handle in select_evictions(live, fresh, self.bound) {
            match self.store.delete(namespace, &handle.id).await {
                Ok(()) => {
                    tracing::info!(
                        group,
                        namespace,
                        artifact = %handle.id,
                        created_at = %handle.created_at,
                        "evicted profile"
                    );
                    report.evicted.push(handle.id);
                }
                Err(e) => {
                    tracing::error!(
                        group,
                        namespace,
                        artifact = %handle.id,
                        error = %e,
                        "evicting profile"
                    );
                    report.failed.push(handle.id);
                }
            }
        }
        report
    }
}
