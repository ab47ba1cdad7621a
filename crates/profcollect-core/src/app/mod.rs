//! App - アプリケーション層
//!
//! ports を組み合わせて 1 回分の収集バッチを実装します。
//!
//! # 主要コンポーネント
//! - **Collector**: fetch → store → retention のバッチ
//! - **RetentionStore**: 作成と retention を group 単位で直列化
//! - **CollectorConfig**: 起動時に組み立てる実行設定
//! - **Settings**: suspend フラグの読み込み
//! - **ClientCredentials**: クライアント証明書の読み込み

pub mod collector;
pub mod config;
pub mod credentials;
pub mod report;
pub mod retention_store;
pub mod settings;

pub use self::collector::{Collector, RunError};
pub use self::config::{CollectorConfig, ConfigError};
pub use self::credentials::{ClientCredentials, CredentialsError};
pub use self::report::RunReport;
pub use self::retention_store::{EvictionReport, RetentionStore, Stored};
pub use self::settings::{Settings, SettingsError};
