//! # transflux-stats
//!
//! 통계 집계 엔진.
//! 폴링 한 번의 스냅샷과 누적 통계 원장을 합쳐 시계열 포인트를 만든다.
//!
//! - `identity`: 토렌트 인스턴스 ID (infohash + 추가 시각 해시)
//! - `tracker`: announce URL → 트래커 라벨
//! - `aggregator`: 사이클 단위 집계 (`stats` / `trackers` / `torrents`)

pub mod aggregator;
pub mod identity;
pub mod tracker;
