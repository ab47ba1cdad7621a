//! RunReport - 1 回の実行結果の集計

use serde::{Deserialize, Serialize};

/// RunReport はバッチ 1 回分の件数
///
/// 失敗はすべてログに出しつつ、ここで件数として残します（終了コードには影響しない）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub endpoints: usize,
    pub stored: usize,
    pub fetch_failed: usize,
    pub store_failed: usize,
    pub evicted: usize,
    pub eviction_failed: usize,
}

impl RunReport {
    /// エンドポイント単位・group 単位の失敗が 1 件も無いか
    pub fn is_clean(&self) -> bool {
        self.fetch_failed == 0 && self.store_failed == 0 && self.eviction_failed == 0
    }
}
