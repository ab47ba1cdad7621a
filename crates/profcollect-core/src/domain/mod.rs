//! Domain model (endpoints, profiles, artifacts, retention).
//!
//! - endpoint: CLI 引数のパースと検証
//! - profile: 取得結果（一時的な値）と取得エラー
//! - artifact: 永続化単位とラベル
//! - retention: 保持上限と削除対象の選択
//! - errors: ストア操作のエラー

pub mod artifact;
pub mod endpoint;
pub mod errors;
pub mod ids;
pub mod profile;
pub mod retention;

pub use artifact::{
    Artifact, ArtifactHandle, GROUP_LABEL_KEY, NewArtifact, PROFILE_DATA_KEY, PROFILE_LABEL_KEY,
};
pub use endpoint::{EndpointSpec, ParseError};
pub use errors::StoreError;
pub use ids::ArtifactId;
pub use profile::{FetchCause, FetchError, Profile};
pub use retention::{InvalidRetentionBound, RetentionBound, select_evictions};
