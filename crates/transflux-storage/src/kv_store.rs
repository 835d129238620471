//! Write-through 키-값 저장소 (KeyValueStore 포트 구현).
//!
//! 시계열 저장소에는 KV API가 없으므로 키 하나를 measurement 하나로 쓴다.
//! - `put`: 캐시 갱신 → measurement 삭제 → 단일 필드 포인트 쓰기.
//!   삭제와 쓰기 사이에 실패하면 값이 유실된다 (원자적이지 않음).
//! - `get`: 프로세스 로컬 캐시 우선, 미스면 최신 포인트를 조회해 캐시한다.
//!
//! 캐시는 프로세스 수명 동안 만료되지 않는다. 같은 프로세스 안에서는
//! 저장소 지연이나 장애와 관계없이 마지막 로컬 쓰기를 읽는다.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use transflux_core::error::CoreError;
use transflux_core::models::point::{DataPoint, FieldValue};
use transflux_core::ports::kv_store::KeyValueStore;
use transflux_core::ports::time_series::TimeSeriesStore;
use tracing::debug;

/// 값을 담는 필드 이름
pub const VALUE_FIELD: &str = "value";

/// 시계열 저장소 기반 write-through KV
pub struct WriteThroughKvStore {
    store: Arc<dyn TimeSeriesStore>,
    cache: Mutex<HashMap<String, String>>,
}

impl WriteThroughKvStore {
    /// 새 KV 저장소 생성 (빈 캐시)
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &str) -> Option<String> {
        self.cache.lock().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for WriteThroughKvStore {
    async fn put(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.cache.lock().insert(key.to_string(), value.to_string());

        self.store.drop_measurement(key).await?;
        let point = DataPoint::new(key, Utc::now()).field(VALUE_FIELD, value);
        self.store.write_points(&[point]).await?;

        debug!("KV 저장: key={key}, {}바이트", value.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CoreError> {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }

        let value = match self.store.last_value(key, VALUE_FIELD).await? {
            Some(FieldValue::String(value)) => value,
            None => String::new(),
            Some(other) => {
                return Err(CoreError::Store(format!(
                    "KV 값 타입 불일치 (key={key}): {other:?}"
                )))
            }
        };

        debug!("KV 캐시 미스: key={key}, {}바이트 로드", value.len());
        self.cache.lock().insert(key.to_string(), value.clone());
        Ok(value)
    }
}
