//! EndpointSpec - 収集対象エンドポイントの検証済み表現
//!
//! CLI 引数 `<group-name>:<https-url>` をパースして `EndpointSpec` を作ります。
//!
//! # 設計原則
//! - 純粋関数（副作用なし、ネットワークに触れない）
//! - 最初の `:` だけを区切りとして扱う（残りは URL の一部: `https://`, ポート番号など）
//! - 1 件でも不正な引数があればバッチ全体を拒否する（all-or-nothing）
//! - group は ConfigMap のラベル値と generateName にそのまま使うため、
//!   両方で受け付けられる形（63 文字以下の小文字英数字・`-`・`.`）に限る

use std::fmt;
use std::str::FromStr;

use url::Url;

const SEPARATOR: char = ':';
const REQUIRED_SCHEME: &str = "https";

/// Kubernetes のラベル値の上限
pub const MAX_GROUP_LEN: usize = 63;

/// ParseError は引数パース時のエラー
///
/// どれもバッチ全体にとって致命的（起動時エラー）です。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed endpoint {token:?}: expected <group-name>:<https-url>")]
    MalformedToken { token: String },

    #[error("invalid group name {group:?}: {reason}")]
    InvalidGroup { group: String, reason: &'static str },

    #[error("invalid endpoint url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("endpoint {url} must use https (got scheme {scheme:?})")]
    InsecureScheme { url: String, scheme: String },
}

/// EndpointSpec は `(group, url)` の検証済みペア
///
/// 起動時に一度だけ作られ、以降は読み取り専用です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    group: String,
    url: Url,
}

impl EndpointSpec {
    /// 生の引数トークンをパース
    ///
    /// # 検証順序
    /// 1. 区切り `:` が存在し、左側（group）が空でない
    /// 2. group がラベル値・オブジェクト名として使える
    /// 3. 右側が URL としてパースできる
    /// 4. scheme が（大文字小文字を無視して）https
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let (group, rest) = raw
            .split_once(SEPARATOR)
            .filter(|(group, _)| !group.is_empty())
            .ok_or_else(|| ParseError::MalformedToken {
                token: raw.to_string(),
            })?;

        validate_group(group).map_err(|reason| ParseError::InvalidGroup {
            group: group.to_string(),
            reason,
        })?;

        let url = Url::parse(rest).map_err(|e| ParseError::InvalidUrl {
            url: rest.to_string(),
            reason: e.to_string(),
        })?;

        if !url.scheme().eq_ignore_ascii_case(REQUIRED_SCHEME) {
            return Err(ParseError::InsecureScheme {
                scheme: url.scheme().to_string(),
                url: rest.to_string(),
            });
        }

        Ok(Self {
            group: group.to_string(),
            url,
        })
    }

    /// 全引数をパース（1 件でも失敗したら最初のエラーを返す）
    pub fn parse_all<I, S>(raw: I) -> Result<Vec<Self>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    /// Artifact のグルーピングキー
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn validate_group(group: &str) -> Result<(), &'static str> {
    if group.len() > MAX_GROUP_LEN {
        return Err("must be at most 63 characters");
    }
    if !group
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err("must consist of lowercase alphanumerics, '-' or '.'");
    }
    let alnum = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_alphanumeric());
    if !alnum(group.bytes().next()) || !alnum(group.bytes().last()) {
        return Err("must start and end with an alphanumeric character");
    }
    Ok(())
}

impl FromStr for EndpointSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.group, SEPARATOR, self.url)
    }
}
