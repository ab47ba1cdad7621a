//! IdGenerator port - Artifact 識別子の生成
//!
//! ConfigMap バックエンドでは API server が名前を決めるため、
//! このポートは InMemory バックエンド（開発・テスト用）で使います。
//!
//! # 実装
//! - **UlidGenerator**: `<group>-<ulid>` 形式

use crate::domain::ArtifactId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は group から一意な Artifact 識別子を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_artifact_id(&self, group: &str) -> ArtifactId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock の時刻を ULID の timestamp 部に使うので、
/// 同じ group 内では識別子の辞書順が生成順（ミリ秒単位）と一致します。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_artifact_id(&self, group: &str) -> ArtifactId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        // k8s の generateName と同じく小文字で揃える
        ArtifactId::new(format!("{group}-{}", ulid.to_string().to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn ids_are_unique_and_prefixed_with_group() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_artifact_id("heap");
        let id2 = id_gen.generate_artifact_id("heap");

        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("heap-"));
        assert_eq!(id1.as_str().len(), "heap-".len() + 26);
    }

    #[test]
    fn ids_sort_by_clock_time() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        let id_gen = UlidGenerator::new(clock.clone());

        let earlier = id_gen.generate_artifact_id("heap");
        clock.advance(Duration::milliseconds(1));
        let later = id_gen.generate_artifact_id("heap");

        assert!(earlier < later);
    }

    #[test]
    fn timestamp_part_comes_from_clock() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id = id_gen.generate_artifact_id("g");
        let ulid: Ulid = id.as_str()["g-".len()..].to_uppercase().parse().unwrap();
        assert_eq!(ulid.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}
