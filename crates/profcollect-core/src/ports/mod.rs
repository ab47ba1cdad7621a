//! Ports - 抽象化レイヤー
//!
//! 外部システム（HTTPS エンドポイント、Kubernetes API、時計）への
//! インターフェースを trait として定義し、実装の詳細を隠蔽します。

pub mod artifact_store;
pub mod clock;
pub mod fetcher;
pub mod id_generator;

pub use self::artifact_store::ArtifactStore;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::fetcher::ProfileFetcher;
pub use self::id_generator::{IdGenerator, UlidGenerator};
