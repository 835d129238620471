//! 키-값 저장소 포트.
//!
//! 구현: `transflux-storage` crate (시계열 저장소 위의 write-through 캐시)
//!
//! 키는 다른 포인트 타입이 쓰는 measurement 이름과 겹치면 안 된다.

use async_trait::async_trait;

use crate::error::CoreError;

/// 문자열 키-값 저장소
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 값 저장 (기존 값 대체)
    async fn put(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// 값 조회 (없으면 빈 문자열)
    async fn get(&self, key: &str) -> Result<String, CoreError>;
}
