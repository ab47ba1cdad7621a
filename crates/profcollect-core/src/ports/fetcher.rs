//! ProfileFetcher port - エンドポイントからプロファイルを取得
//!
//! 本番実装は `impls::HttpsFetcher`（mTLS クライアント）。
//! オーケストレータのテストではフェイク実装に差し替えます。

use async_trait::async_trait;

use crate::domain::{EndpointSpec, FetchError, Profile};

/// ProfileFetcher は 1 エンドポイントにつき 1 回のリクエストを行う
///
/// リトライはしない。失敗はエンドポイント単位で、呼び出し側はログを出して次に進む。
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, endpoint: &EndpointSpec) -> Result<Profile, FetchError>;
}
