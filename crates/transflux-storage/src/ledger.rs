//! 누적 통계 원장 저장소.
//!
//! 원장 전체(모든 클라이언트)를 JSON 하나로 직렬화해 KV 키 하나에 보관한다.
//! 디코딩 실패는 빈 원장으로 대체하지 않고 에러로 전파한다 (이력 유실 방지).

use std::sync::Arc;
use transflux_core::error::CoreError;
use transflux_core::models::ledger::HistoricalLedger;
use transflux_core::ports::kv_store::KeyValueStore;
use tracing::debug;

/// 원장이 저장되는 기본 KV 키 (`stats`/`trackers`/`torrents`와 겹치지 않아야 함)
pub const LEDGER_KEY: &str = "transflux_tracker_ledger";

/// 원장 로드/저장
pub struct LedgerStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl LedgerStore {
    /// 기본 키로 원장 저장소 생성
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, LEDGER_KEY)
    }

    /// 지정 키로 원장 저장소 생성
    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// 원장 로드 — `client_name` 항목이 없으면 빈 항목을 만든다
    pub async fn load(&self, client_name: &str) -> Result<HistoricalLedger, CoreError> {
        let raw = self.kv.get(&self.key).await?;

        let mut ledger = if raw.trim().is_empty() {
            HistoricalLedger::new()
        } else {
            serde_json::from_str(&raw).map_err(|e| CoreError::LedgerCorrupted {
                key: self.key.clone(),
                message: e.to_string(),
            })?
        };

        ledger.ensure_client(client_name);
        Ok(ledger)
    }

    /// 원장 전체를 한 번의 `put`으로 저장
    pub async fn save(&self, ledger: &HistoricalLedger) -> Result<(), CoreError> {
        let raw = serde_json::to_string(ledger)?;
        self.kv.put(&self.key, &raw).await?;
        debug!("원장 저장: {}바이트", raw.len());
        Ok(())
    }
}
