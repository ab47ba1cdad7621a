//! Artifact model: 取得したプロファイルの永続化単位
//!
//! Artifact は作成後に変更されません（immutable）。可能な操作は削除のみです。
//! group は一意な名前ではなくグルーピングキーで、同じ group の Artifact が複数存在します。

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ArtifactId;

/// 発見用の固定ラベル（値は空文字）
pub const PROFILE_LABEL_KEY: &str = "olm.openshift.io/pprof";

/// group を保持するラベル（list 時のセレクタに使う）
pub const GROUP_LABEL_KEY: &str = "olm.openshift.io/pprof-group";

/// payload を格納するキー
pub const PROFILE_DATA_KEY: &str = "profile.pb.gz";

/// ストアに作成を依頼する Artifact（id と createdAt はストアが付与）
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub group: String,
    pub namespace: String,
    pub payload: Bytes,
}

impl NewArtifact {
    pub fn new(group: impl Into<String>, namespace: impl Into<String>, payload: Bytes) -> Self {
        Self {
            group: group.into(),
            namespace: namespace.into(),
            payload,
        }
    }

    /// 作成時に付与するラベル一式
    pub fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (PROFILE_LABEL_KEY.to_string(), String::new()),
            (GROUP_LABEL_KEY.to_string(), self.group.clone()),
        ])
    }
}

/// ArtifactHandle は payload を含まない Artifact のメタ情報
///
/// list の戻り値であり、retention の判断に必要な情報だけを持ちます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    pub id: ArtifactId,
    pub group: String,
    pub namespace: String,
    pub created_at: DateTime<Utc>,
}

/// 永続化された Artifact
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub group: String,
    pub namespace: String,
    pub created_at: DateTime<Utc>,
    pub immutable: bool,
    pub labels: BTreeMap<String, String>,
    pub payload: Bytes,
}

impl Artifact {
    pub fn handle(&self) -> ArtifactHandle {
        ArtifactHandle {
            id: self.id.clone(),
            group: self.group.clone(),
            namespace: self.namespace.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_artifact_carries_marker_and_group_labels() {
        let draft = NewArtifact::new("olm-operator", "openshift-operator-lifecycle-manager", Bytes::new());
        let labels = draft.labels();
        assert_eq!(labels.get(PROFILE_LABEL_KEY).map(String::as_str), Some(""));
        assert_eq!(
            labels.get(GROUP_LABEL_KEY).map(String::as_str),
            Some("olm-operator")
        );
        assert_eq!(labels.len(), 2);
    }
}
