//! ConfigMapArtifactStore - Kubernetes ConfigMap を Artifact として使う本番実装
//!
//! # マッピング
//! - 識別子: `metadata.name`（`generateName: "<group>-"` から API server が生成）
//! - createdAt: `metadata.creationTimestamp`（秒単位なので tie-break が効く）
//! - immutable: `immutable: true`
//! - ラベル: 発見用マーカー + group
//! - payload: `binaryData["profile.pb.gz"]`

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams, ObjectMeta, PostParams};

use crate::domain::{
    Artifact, ArtifactHandle, ArtifactId, GROUP_LABEL_KEY, NewArtifact, PROFILE_DATA_KEY,
    PROFILE_LABEL_KEY, StoreError,
};
use crate::ports::ArtifactStore;

/// API server が受け付ける ConfigMap の data + binaryData の合計サイズ
pub const MAX_CONFIGMAP_DATA_BYTES: u64 = 1024 * 1024;

pub struct ConfigMapArtifactStore {
    client: Client,
}

impl ConfigMapArtifactStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// in-cluster 設定（または KUBECONFIG）からクライアントを作成
    pub async fn try_default() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn api(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// 作成する ConfigMap を組み立てる
fn configmap_for(artifact: &NewArtifact) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            generate_name: Some(format!("{}-", artifact.group)),
            namespace: Some(artifact.namespace.clone()),
            labels: Some(artifact.labels()),
            ..ObjectMeta::default()
        },
        immutable: Some(true),
        binary_data: Some(BTreeMap::from([(
            PROFILE_DATA_KEY.to_string(),
            ByteString(artifact.payload.to_vec()),
        )])),
        ..ConfigMap::default()
    }
}

/// list 用のラベルセレクタ
fn group_selector(group: &str) -> String {
    format!("{PROFILE_LABEL_KEY},{GROUP_LABEL_KEY}={group}")
}

/// ConfigMap から ArtifactHandle を作る（名前か作成時刻が無いものは対象外）
fn handle_from(cm: &ConfigMap, namespace: &str, group: &str) -> Option<ArtifactHandle> {
    let name = cm.metadata.name.clone()?;
    let created_at = cm.metadata.creation_timestamp.as_ref()?.0;
    Some(ArtifactHandle {
        id: ArtifactId::from(name),
        group: group.to_string(),
        namespace: namespace.to_string(),
        created_at,
    })
}

#[async_trait]
impl ArtifactStore for ConfigMapArtifactStore {
    async fn create(&self, artifact: NewArtifact) -> Result<Artifact, StoreError> {
        let fail = |reason: String| StoreError::CreateFailed {
            group: artifact.group.clone(),
            namespace: artifact.namespace.clone(),
            reason,
        };

        let created = self
            .api(&artifact.namespace)
            .create(&PostParams::default(), &configmap_for(&artifact))
            .await
            .map_err(|e| fail(e.to_string()))?;

        let name = created
            .metadata
            .name
            .ok_or_else(|| fail("API server returned a ConfigMap without a name".to_string()))?;
        let created_at = created
            .metadata
            .creation_timestamp
            .map(|t| t.0)
            .unwrap_or_else(Utc::now);

        Ok(Artifact {
            id: ArtifactId::from(name),
            created_at,
            immutable: created.immutable.unwrap_or(true),
            labels: created.metadata.labels.unwrap_or_else(|| artifact.labels()),
            group: artifact.group,
            namespace: artifact.namespace,
            payload: artifact.payload,
        })
    }

    async fn list(&self, namespace: &str, group: &str) -> Result<Vec<ArtifactHandle>, StoreError> {
        let params = ListParams::default().labels(&group_selector(group));
        let configmaps = self
            .api(namespace)
            .list(&params)
            .await
            .map_err(|e| StoreError::ListFailed {
                group: group.to_string(),
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })?;

        Ok(configmaps
            .items
            .iter()
            .filter(|cm| cm.metadata.deletion_timestamp.is_none())
            .filter_map(|cm| handle_from(cm, namespace, group))
            .collect())
    }

    async fn delete(&self, namespace: &str, id: &ArtifactId) -> Result<(), StoreError> {
        self.api(namespace)
            .delete(id.as_str(), &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::DeleteFailed {
                id: id.clone(),
                namespace: namespace.to_string(),
                reason: e.to_string(),
            })
    }
}
