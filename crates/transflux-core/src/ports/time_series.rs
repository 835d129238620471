//! 시계열 저장소 포트.
//!
//! 구현: `transflux-network` crate (InfluxDB v1 HTTP),
//! `transflux-storage` crate (인메모리)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::point::{DataPoint, FieldValue};

/// 시계열 저장소 — 포인트 추가, 최신값 조회, measurement 삭제만 지원한다
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// 포인트 배치 쓰기
    async fn write_points(&self, points: &[DataPoint]) -> Result<(), CoreError>;

    /// measurement의 모든 데이터 삭제
    async fn drop_measurement(&self, measurement: &str) -> Result<(), CoreError>;

    /// measurement에서 필드의 가장 최근 값 조회 (데이터가 없으면 None)
    async fn last_value(
        &self,
        measurement: &str,
        field: &str,
    ) -> Result<Option<FieldValue>, CoreError>;
}
