//! Domain identifiers.
//!
//! # ArtifactId
//! Artifact の識別子はストアが生成します（呼び出し側は指定しない）。
//! - ConfigMap バックエンド: API server が `generateName` から生成する名前
//! - InMemory バックエンド: `<group>-<ulid>`（生成順で辞書順ソート可能）
//!
//! retention の tie-break は識別子の辞書順で行うため、`Ord` は文字列比較です。

use serde::{Deserialize, Serialize};
use std::fmt;

/// ArtifactId は不透明な Artifact 識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ArtifactId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ArtifactId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
