//! HttpsFetcher - クライアント証明書付き HTTPS でプロファイルを取得
//!
//! # 実装詳細
//! - reqwest（rustls）のクライアントを 1 つ作り、全エンドポイントで使い回す
//! - サーバ証明書の検証は TrustPolicy で決める（検証スキップは明示的な opt-in）
//! - 2xx 以外は失敗扱い（本文は保存しない）
//! - 本文は `max_body_bytes` を超えた時点で打ち切る

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{Certificate, Client, Identity};
use url::Url;

use crate::domain::{EndpointSpec, FetchCause, FetchError, Profile};
use crate::ports::{Clock, ProfileFetcher, SystemClock};

/// サーバ証明書の信頼ポリシー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustPolicy {
    /// システムのルート証明書（と任意の追加 CA）で検証する
    Verify { ca_bundle_pem: Option<Vec<u8>> },
    /// サーバ証明書を検証しない（クライアント証明書は提示する）
    InsecureSkipVerify,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::Verify {
            ca_bundle_pem: None,
        }
    }
}

/// TransportSettings は HTTPS クライアントの構築に必要な設定
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// PEM 形式の証明書と秘密鍵（連結済み）
    pub identity_pem: Vec<u8>,
    pub trust: TrustPolicy,
    pub fetch_timeout: Duration,
    pub max_body_bytes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("loading client certificate: {0}")]
    Identity(#[source] reqwest::Error),

    #[error("loading CA bundle: {0}")]
    CaBundle(#[source] reqwest::Error),

    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

pub struct HttpsFetcher {
    client: Client,
    max_body_bytes: u64,
    clock: Arc<dyn Clock>,
}

impl HttpsFetcher {
    pub fn new(settings: &TransportSettings) -> Result<Self, TransportError> {
        let identity =
            Identity::from_pem(&settings.identity_pem).map_err(TransportError::Identity)?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .timeout(settings.fetch_timeout)
            .user_agent(concat!("profcollect/", env!("CARGO_PKG_VERSION")));

        match &settings.trust {
            TrustPolicy::InsecureSkipVerify => {
                tracing::warn!("server certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
            TrustPolicy::Verify {
                ca_bundle_pem: Some(pem),
            } => {
                for cert in Certificate::from_pem_bundle(pem).map_err(TransportError::CaBundle)? {
                    builder = builder.add_root_certificate(cert);
                }
            }
            TrustPolicy::Verify { ca_bundle_pem: None } => {}
        }

        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self::from_client(client, settings.max_body_bytes))
    }

    /// 構築済みのクライアントから作成
    pub fn from_client(client: Client, max_body_bytes: u64) -> Self {
        Self {
            client,
            max_body_bytes,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    async fn get(&self, group: &str, url: &Url) -> Result<Profile, FetchError> {
        let fail = |cause| FetchError {
            group: group.to_string(),
            url: url.clone(),
            cause,
        };

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fail(transport_cause(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchCause::Status(status)));
        }

        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(fail(FetchCause::TooLarge { limit }));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| fail(body_cause(e)))? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(fail(FetchCause::TooLarge { limit }));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(Profile {
            group: group.to_string(),
            payload: Bytes::from(body),
            fetched_at: self.clock.now(),
        })
    }
}

fn transport_cause(e: reqwest::Error) -> FetchCause {
    if e.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Transport(e)
    }
}

fn body_cause(e: reqwest::Error) -> FetchCause {
    if e.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Body(e)
    }
}

#[async_trait]
impl ProfileFetcher for HttpsFetcher {
    async fn fetch(&self, endpoint: &EndpointSpec) -> Result<Profile, FetchError> {
        self.get(endpoint.group(), endpoint.url()).await
    }
}
