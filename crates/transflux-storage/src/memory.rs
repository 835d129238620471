//! 인메모리 시계열 저장소 (TimeSeriesStore 포트 구현).
//!
//! dry-run 모드와 테스트에서 InfluxDB 대신 사용한다.
//! `set_unavailable(true)`이면 모든 호출이 네트워크 에러를 반환한다.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use transflux_core::error::CoreError;
use transflux_core::models::point::{DataPoint, FieldValue};
use transflux_core::ports::time_series::TimeSeriesStore;
use tracing::debug;

/// 인메모리 시계열 저장소
#[derive(Default)]
pub struct MemoryTimeSeriesStore {
    measurements: Mutex<BTreeMap<String, Vec<DataPoint>>>,
    unavailable: AtomicBool,
    queries: AtomicUsize,
}

impl MemoryTimeSeriesStore {
    /// 빈 저장소 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 장애 상태 전환 (true면 모든 호출 실패)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// measurement의 포인트 복제본
    pub fn points(&self, measurement: &str) -> Vec<DataPoint> {
        self.measurements
            .lock()
            .get(measurement)
            .cloned()
            .unwrap_or_default()
    }

    /// 전체 포인트 수
    pub fn len(&self) -> usize {
        self.measurements.lock().values().map(Vec::len).sum()
    }

    /// 저장소가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `last_value` 호출 횟수
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::Network("인메모리 저장소 장애 상태".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryTimeSeriesStore {
    async fn write_points(&self, points: &[DataPoint]) -> Result<(), CoreError> {
        self.check_available()?;

        let mut measurements = self.measurements.lock();
        for point in points {
            measurements
                .entry(point.measurement.clone())
                .or_default()
                .push(point.clone());
        }

        debug!("인메모리 포인트 {}개 저장", points.len());
        Ok(())
    }

    async fn drop_measurement(&self, measurement: &str) -> Result<(), CoreError> {
        self.check_available()?;
        self.measurements.lock().remove(measurement);
        Ok(())
    }

    async fn last_value(
        &self,
        measurement: &str,
        field: &str,
    ) -> Result<Option<FieldValue>, CoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let measurements = self.measurements.lock();
        let latest = measurements
            .get(measurement)
            .into_iter()
            .flatten()
            .filter(|p| p.fields.contains_key(field))
            .max_by_key(|p| p.timestamp)
            .and_then(|p| p.fields.get(field).cloned());

        Ok(latest)
    }
}
