//! dry-run 저장소.
//!
//! 쓰기 포인트를 line protocol 형태로 로그에 남기고 내부 저장소에 위임한다.
//! 내부 저장소는 보통 인메모리라 InfluxDB로는 아무것도 전송되지 않는다.

use async_trait::async_trait;
use std::sync::Arc;
use transflux_core::error::CoreError;
use transflux_core::models::point::{DataPoint, FieldValue};
use transflux_core::ports::time_series::TimeSeriesStore;
use transflux_network::line_protocol;
use tracing::info;

/// 로그 출력 래퍼
pub struct LoggingStore {
    inner: Arc<dyn TimeSeriesStore>,
    /// 로그에서 제외할 measurement (원장처럼 큰 KV 값)
    quiet: Vec<String>,
}

impl LoggingStore {
    /// 내부 저장소를 감싸는 래퍼 생성
    pub fn new(inner: Arc<dyn TimeSeriesStore>) -> Self {
        Self {
            inner,
            quiet: Vec::new(),
        }
    }

    /// 로그에서 제외할 measurement 추가
    pub fn quiet(mut self, measurement: impl Into<String>) -> Self {
        self.quiet.push(measurement.into());
        self
    }
}

#[async_trait]
impl TimeSeriesStore for LoggingStore {
    async fn write_points(&self, points: &[DataPoint]) -> Result<(), CoreError> {
        for point in points {
            if self.quiet.contains(&point.measurement) {
                continue;
            }
            if let Some(line) = line_protocol::encode_point(point) {
                info!("[dry-run] {line}");
            }
        }
        self.inner.write_points(points).await
    }

    async fn drop_measurement(&self, measurement: &str) -> Result<(), CoreError> {
        self.inner.drop_measurement(measurement).await
    }

    async fn last_value(
        &self,
        measurement: &str,
        field: &str,
    ) -> Result<Option<FieldValue>, CoreError> {
        self.inner.last_value(measurement, field).await
    }
}
