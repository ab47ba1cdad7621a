//! InMemoryArtifactStore - 開発・テスト用の ArtifactStore
//!
//! # 実装詳細
//! - namespace ごとに `BTreeMap<ArtifactId, Artifact>` で管理
//! - createdAt は Clock から、識別子は IdGenerator から取得
//! - `with_namespaces` を指定すると、存在しない namespace への create を拒否する
//!   （API server の "namespace not found" 相当）

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Artifact, ArtifactHandle, ArtifactId, NewArtifact, StoreError};
use crate::ports::{ArtifactStore, Clock, IdGenerator, UlidGenerator};

type Namespace = BTreeMap<ArtifactId, Artifact>;

pub struct InMemoryArtifactStore<C> {
    namespaces: Arc<Mutex<HashMap<String, Namespace>>>,
    allowed_namespaces: Option<HashSet<String>>,
    clock: C,
    ids: Box<dyn IdGenerator>,
}

impl<C: Clock + Clone + 'static> InMemoryArtifactStore<C> {
    pub fn new(clock: C) -> Self {
        let ids = Box::new(UlidGenerator::new(clock.clone()));
        Self {
            namespaces: Arc::new(Mutex::new(HashMap::new())),
            allowed_namespaces: None,
            clock,
            ids,
        }
    }
}

impl<C: Clock> InMemoryArtifactStore<C> {
    /// create を許可する namespace を限定
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_namespaces = Some(namespaces.into_iter().map(Into::into).collect());
        self
    }

    /// namespace 内の group に属する Artifact（createdAt 昇順）
    pub async fn artifacts(&self, namespace: &str, group: &str) -> Vec<Artifact> {
        let namespaces = self.namespaces.lock().await;
        let mut found: Vec<Artifact> = namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.values())
            .filter(|a| a.group == group)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        found
    }

    /// 全 namespace の Artifact 数
    pub async fn len(&self) -> usize {
        self.namespaces.lock().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<C: Clock> ArtifactStore for InMemoryArtifactStore<C> {
    async fn create(&self, artifact: NewArtifact) -> Result<Artifact, StoreError> {
        if let Some(allowed) = &self.allowed_namespaces
            && !allowed.contains(&artifact.namespace)
        {
            return Err(StoreError::CreateFailed {
                group: artifact.group,
                reason: format!("namespace {:?} not found", artifact.namespace),
                namespace: artifact.namespace,
            });
        }

        let labels = artifact.labels();
        let created = Artifact {
            id: self.ids.generate_artifact_id(&artifact.group),
            group: artifact.group,
            namespace: artifact.namespace,
            created_at: self.clock.now(),
            immutable: true,
            labels,
            payload: artifact.payload,
        };

        let mut namespaces = self.namespaces.lock().await;
        let ns = namespaces.entry(created.namespace.clone()).or_default();
        if ns.contains_key(&created.id) {
            return Err(StoreError::CreateFailed {
                group: created.group.clone(),
                namespace: created.namespace.clone(),
                reason: format!("artifact {} already exists", created.id),
            });
        }
        ns.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn list(&self, namespace: &str, group: &str) -> Result<Vec<ArtifactHandle>, StoreError> {
        let namespaces = self.namespaces.lock().await;
        Ok(namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.values())
            .filter(|a| a.group == group)
            .map(Artifact::handle)
            .collect())
    }

    async fn delete(&self, namespace: &str, id: &ArtifactId) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.lock().await;
        namespaces
            .get_mut(namespace)
            .and_then(|ns| ns.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::DeleteFailed {
                id: id.clone(),
                namespace: namespace.to_string(),
                reason: "not found".to_string(),
            })
    }
}
