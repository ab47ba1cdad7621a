//! Retention policy: group ごとに保持する Artifact 数の上限
//!
//! # 方針
//! - createdAt の降順で並べ、上位 `bound` 件を残し残りを削除対象にする
//! - createdAt が同じ場合は識別子の辞書順（大きい方を新しいとみなす）
//! - 直前に作成した Artifact は常に保持する（時計の分解能で順位が入れ替わっても消さない）
//!
//! 判断ロジックは純粋関数として切り出し、削除の実行は `RetentionStore` に任せます。

use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use super::artifact::ArtifactHandle;
use super::ids::ArtifactId;

/// RetentionBound は group あたりの最大保持数（1 以上）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionBound(NonZeroUsize);

/// 上限値が不正（0 以下、または数値でない）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("retention limit must be a positive integer (got {0:?})")]
pub struct InvalidRetentionBound(pub String);

impl RetentionBound {
    pub fn new(value: i64) -> Result<Self, InvalidRetentionBound> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| InvalidRetentionBound(value.to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl FromStr for RetentionBound {
    type Err = InvalidRetentionBound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| InvalidRetentionBound(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for RetentionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 新しい順に比較（createdAt 降順、同時刻なら識別子降順）
fn newest_first(a: &ArtifactHandle, b: &ArtifactHandle) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// 削除すべき Artifact を選ぶ
///
/// # Arguments
/// * `live` - 同じ (namespace, group) の現存 Artifact
/// * `fresh` - 直前に作成した Artifact（常に保持。`live` に含まれていなくてもよい）
/// * `bound` - 保持上限
///
/// # Returns
/// 古い順ではなく「新しい順で bound 件目以降」の並びで返す
pub fn select_evictions(
    mut live: Vec<ArtifactHandle>,
    fresh: Option<&ArtifactId>,
    bound: RetentionBound,
) -> Vec<ArtifactHandle> {
    live.sort_by(newest_first);

    let mut keep = bound.get();
    if let Some(fresh) = fresh {
        match live.iter().position(|h| &h.id == fresh) {
            Some(pos) => {
                let pinned = live.remove(pos);
                live.insert(0, pinned);
            }
            // list に未反映（結果整合）でも 1 枠は新規分として確保する
            None => keep -= 1,
        }
    }

    if live.len() <= keep {
        return Vec::new();
    }
    live.split_off(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn handle(id: &str, secs: i64) -> ArtifactHandle {
        ArtifactHandle {
            id: ArtifactId::new(id),
            group: "heap".to_string(),
            namespace: "ns".to_string(),
            created_at: at(secs),
        }
    }

    fn ids(handles: &[ArtifactHandle]) -> Vec<&str> {
        handles.iter().map(|h| h.id.as_str()).collect()
    }

    #[rstest]
    #[case::one("1", 1)]
    #[case::padded(" 7 ", 7)]
    fn bound_parses_positive_values(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(raw.parse::<RetentionBound>().unwrap().get(), expected);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-3")]
    #[case::garbage("three")]
    fn bound_rejects_non_positive_values(#[case] raw: &str) {
        assert!(raw.parse::<RetentionBound>().is_err());
    }

    #[test]
    fn nothing_to_evict_under_bound() {
        let live = vec![handle("a", 1), handle("b", 2)];
        let evicted = select_evictions(live, None, RetentionBound::new(2).unwrap());
        assert!(evicted.is_empty());
    }

    #[test]
    fn evicts_oldest_beyond_bound() {
        let live = vec![handle("c", 3), handle("a", 1), handle("d", 4), handle("b", 2)];
        let evicted = select_evictions(live, None, RetentionBound::new(2).unwrap());
        assert_eq!(ids(&evicted), vec!["b", "a"]);
    }

    #[test]
    fn ties_break_on_identifier() {
        // 同時刻: 識別子が大きい方を新しいとみなす
        let live = vec![handle("heap-b", 5), handle("heap-c", 5), handle("heap-a", 5)];
        let evicted = select_evictions(live, None, RetentionBound::new(1).unwrap());
        assert_eq!(ids(&evicted), vec!["heap-b", "heap-a"]);
    }

    #[test]
    fn fresh_artifact_is_always_kept() {
        // 新規分が同時刻で辞書順最小でも残す
        let live = vec![handle("heap-z", 10), handle("heap-a", 10), handle("heap-m", 3)];
        let fresh = ArtifactId::new("heap-a");
        let evicted = select_evictions(live, Some(&fresh), RetentionBound::new(2).unwrap());
        assert_eq!(ids(&evicted), vec!["heap-m"]);
    }

    #[test]
    fn fresh_artifact_missing_from_listing_reserves_a_slot() {
        let live = vec![handle("old-1", 1), handle("old-2", 2)];
        let fresh = ArtifactId::new("new");
        let evicted = select_evictions(live, Some(&fresh), RetentionBound::new(2).unwrap());
        assert_eq!(ids(&evicted), vec!["old-1"]);
    }

    #[test]
    fn bound_of_one_keeps_only_fresh() {
        let live = vec![handle("old", 1), handle("new", 2)];
        let fresh = ArtifactId::new("new");
        let evicted = select_evictions(live, Some(&fresh), RetentionBound::new(1).unwrap());
        assert_eq!(ids(&evicted), vec!["old"]);
    }
}
