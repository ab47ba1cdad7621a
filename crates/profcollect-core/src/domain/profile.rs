//! Profile: 1 回の取得結果（永続化前の一時的な値）
//!
//! payload は不透明なバイト列として扱い、解釈しません。

use bytes::Bytes;
use chrono::{DateTime, Utc};
use url::Url;

/// Profile は取得に成功した結果
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub group: String,
    pub payload: Bytes,
    pub fetched_at: DateTime<Utc>,
}

/// FetchCause は取得失敗の分類
#[derive(Debug, thiserror::Error)]
pub enum FetchCause {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("reading response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

/// FetchError はエンドポイント単位のエラー（バッチにとって非致命的）
#[derive(Debug, thiserror::Error)]
#[error("fetching {group} from {url}: {cause}")]
pub struct FetchError {
    pub group: String,
    pub url: Url,
    #[source]
    pub cause: FetchCause,
}
