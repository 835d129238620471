//! # transflux-storage
//!
//! 저장소 어댑터.
//! 키-값 저장 API가 없는 시계열 저장소 위에 write-through KV를 얹고,
//! 그 위에 트래커별 누적 통계 원장을 JSON 하나로 보관한다.
//!
//! ## 모듈
//! - `kv_store`: write-through KV (KeyValueStore 구현)
//! - `ledger`: 누적 통계 원장 로드/저장
//! - `memory`: 인메모리 시계열 저장소 (TimeSeriesStore 구현, dry-run/테스트용)

pub mod kv_store;
pub mod ledger;
pub mod memory;
