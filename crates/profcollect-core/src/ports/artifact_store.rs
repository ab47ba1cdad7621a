//! ArtifactStore port - Artifact の永続化先（ConfigMap / InMemory）
//!
//! # 設計原則
//! - create は immutable な Artifact を作る（名前はストアが生成）
//! - list は (namespace, group) で絞り込む
//! - delete は識別子単位
//! - retention の判断はここでは行わない（`RetentionStore` の責務）

use async_trait::async_trait;

use crate::domain::{Artifact, ArtifactHandle, ArtifactId, NewArtifact, StoreError};

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Artifact を作成（id と createdAt はストアが付与）
    async fn create(&self, artifact: NewArtifact) -> Result<Artifact, StoreError>;

    /// namespace 内の group に属する現存 Artifact を列挙
    async fn list(&self, namespace: &str, group: &str) -> Result<Vec<ArtifactHandle>, StoreError>;

    /// Artifact を削除
    async fn delete(&self, namespace: &str, id: &ArtifactId) -> Result<(), StoreError>;
}
