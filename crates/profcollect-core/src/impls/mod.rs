//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpsFetcher**: mTLS クライアントによる取得（本番用）
//! - **ConfigMapArtifactStore**: Kubernetes ConfigMap への保存（本番用）
//! - **InMemoryArtifactStore**: 開発・テスト用のストア

pub mod configmap_store;
pub mod https_fetcher;
pub mod inmem_store;

pub use self::configmap_store::ConfigMapArtifactStore;
pub use self::https_fetcher::{HttpsFetcher, TransportError, TransportSettings, TrustPolicy};
pub use self::inmem_store::InMemoryArtifactStore;
