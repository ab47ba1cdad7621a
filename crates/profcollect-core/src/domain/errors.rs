//! Errors - ストア操作のエラー型
//!
//! # 分類
//! - CreateFailed: エンドポイント単位で非致命的（ログを出して次へ）
//! - ListFailed / DeleteFailed: group 単位で非致命的（作成済みの Artifact は巻き戻さない）

use super::ids::ArtifactId;

/// StoreError は ArtifactStore 操作の失敗
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("creating artifact for group {group} in namespace {namespace}: {reason}")]
    CreateFailed {
        group: String,
        namespace: String,
        reason: String,
    },

    #[error("listing artifacts for group {group} in namespace {namespace}: {reason}")]
    ListFailed {
        group: String,
        namespace: String,
        reason: String,
    },

    #[error("deleting artifact {id} in namespace {namespace}: {reason}")]
    DeleteFailed {
        id: ArtifactId,
        namespace: String,
        reason: String,
    },
}
