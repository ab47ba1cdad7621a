//! profcollect - pprof を取得して ConfigMap として保存する CronJob 用バイナリ
//!
//! # フロー
//! 1. 設定オブジェクトを読み、suspend なら何もせず終了
//! 2. エンドポイント引数をすべて検証（1 つでも不正なら何もせず終了）
//! 3. クライアント証明書を読み込み、HTTPS クライアントと Kubernetes クライアントを作成
//! 4. 各エンドポイントを取得・保存し、group ごとに retention
//!
//! 終了コード: 0 = 成功または suspend、1 = 起動時エラー / 実行期限超過、2 = 引数の書式エラー。
//! エンドポイント単位の失敗はログに出すだけで終了コードには影響しません。

mod cli;
mod logging;

use std::fs;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use profcollect_core::app::{ClientCredentials, Collector, CollectorConfig, Settings};
use profcollect_core::domain::EndpointSpec;
use profcollect_core::impls::{ConfigMapArtifactStore, HttpsFetcher, TransportSettings, TrustPolicy};

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_format);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "collect-profiles failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = Settings::load(&args.config_path).context("loading configuration")?;
    if settings.suspend {
        tracing::info!(config = %args.config_path.display(), "collection suspended, exiting");
        return Ok(());
    }

    let endpoints =
        EndpointSpec::parse_all(&args.endpoints).context("invalid endpoint argument")?;

    let config = CollectorConfig::new(args.namespace, args.retention_limit)?
        .with_concurrency(args.concurrency)
        .with_run_timeout(Duration::from_secs(args.run_timeout_secs))?;

    let credentials =
        ClientCredentials::load(&args.tls_cert_path).context("loading client certificate")?;

    let trust = if args.insecure_skip_tls_verify {
        TrustPolicy::InsecureSkipVerify
    } else {
        let ca_bundle_pem = args
            .ca_cert
            .as_deref()
            .map(|path| {
                fs::read(path).with_context(|| format!("reading CA bundle {}", path.display()))
            })
            .transpose()?;
        TrustPolicy::Verify { ca_bundle_pem }
    };

    let fetcher = HttpsFetcher::new(&TransportSettings {
        identity_pem: credentials.identity_pem(),
        trust,
        fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
        max_body_bytes: args.max_profile_bytes,
    })?;

    let store = ConfigMapArtifactStore::try_default()
        .await
        .context("creating Kubernetes client")?;

    let report = Collector::new(config, fetcher, store).run(&endpoints).await?;

    if !report.is_clean() {
        tracing::warn!(
            fetch_failed = report.fetch_failed,
            store_failed = report.store_failed,
            eviction_failed = report.eviction_failed,
            "some endpoints were not collected"
        );
    }
    Ok(())
}
