//! CollectorConfig - 起動時に一度だけ組み立てる実行設定
//!
//! グローバルな可変状態は持たず、この構造体を Collector と RetentionStore に渡します。

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::domain::RetentionBound;

pub const DEFAULT_RETENTION: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);
/// ConfigMap の data + binaryData の上限（1 MiB）に合わせる
///
/// これより大きい本文は取得できても create で拒否されるため、取得時に打ち切る。
pub const DEFAULT_MAX_PROFILE_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("namespace must not be empty")]
    EmptyNamespace,

    #[error("run timeout must be greater than zero")]
    ZeroRunTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    namespace: String,
    retention: RetentionBound,
    concurrency: NonZeroUsize,
    run_timeout: Duration,
}

impl CollectorConfig {
    /// 逐次実行・既定のタイムアウトで作成
    pub fn new(namespace: impl Into<String>, retention: RetentionBound) -> Result<Self, ConfigError> {
        let namespace = namespace.into();
        if namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        Ok(Self {
            namespace,
            retention,
            concurrency: NonZeroUsize::MIN,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        })
    }

    /// 並行して取得するエンドポイント数（1 なら逐次）
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Result<Self, ConfigError> {
        if run_timeout.is_zero() {
            return Err(ConfigError::ZeroRunTimeout);
        }
        self.run_timeout = run_timeout;
        Ok(self)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn retention(&self) -> RetentionBound {
        self.retention
    }

    pub fn concurrency(&self) -> NonZeroUsize {
        self.concurrency
    }

    pub fn run_timeout(&self) -> Duration {
        self.run_timeout
    }
}
