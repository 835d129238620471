//! TRANSFLUX 도메인 모델.
//!
//! RPC 스냅샷, 시계열 포인트, 누적 통계 원장을 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod ledger;
pub mod point;
pub mod torrent;
