//! profcollect-core
//!
//! HTTPS の pprof エンドポイントからプロファイルを取得し、
//! immutable な Artifact として保存する収集バッチの中核です。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（endpoint, profile, artifact, retention, errors）
//! - **ports**: 抽象化レイヤー（ArtifactStore, ProfileFetcher, Clock, IdGenerator）
//! - **impls**: 実装（HttpsFetcher, ConfigMapArtifactStore, InMemoryArtifactStore）
//! - **app**: アプリケーションロジック（Collector, RetentionStore, 設定の読み込み）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
