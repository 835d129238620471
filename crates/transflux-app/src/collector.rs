//! 수집 루프.
//!
//! 고정 주기로 설정된 클라이언트를 순서대로 폴링하고, 집계된 포인트를
//! 클라이언트 단위로 저장소에 쓴다. 한 클라이언트의 실패(RPC, 원장, 쓰기)는
//! 로그만 남기고 다음 클라이언트로 넘어간다.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use transflux_core::config::{AppConfig, ClientConfig};
use transflux_core::error::CoreError;
use transflux_core::ports::kv_store::KeyValueStore;
use transflux_core::ports::rpc_client::TorrentRpcClient;
use transflux_core::ports::time_series::TimeSeriesStore;
use transflux_network::transmission::TransmissionRpcClient;
use transflux_stats::aggregator::StatsAggregator;
use transflux_storage::kv_store::WriteThroughKvStore;
use transflux_storage::ledger::LedgerStore;
use tracing::{debug, error, info, warn};

/// 폴링 대상 — 설정과 RPC 어댑터
pub struct ClientHandle {
    /// 클라이언트 설정
    pub config: ClientConfig,
    /// RPC 어댑터
    pub rpc: Arc<dyn TorrentRpcClient>,
}

/// 수집기
pub struct Collector {
    clients: Vec<ClientHandle>,
    aggregator: StatsAggregator,
    sink: Arc<dyn TimeSeriesStore>,
    interval: Duration,
}

impl Collector {
    /// 구성 요소로 수집기 생성
    pub fn new(
        clients: Vec<ClientHandle>,
        aggregator: StatsAggregator,
        sink: Arc<dyn TimeSeriesStore>,
        interval: Duration,
    ) -> Self {
        Self {
            clients,
            aggregator,
            sink,
            interval,
        }
    }

    /// 설정으로 수집기 와이어링
    ///
    /// 원장 KV는 `store` 위에 올라가고, 포인트도 같은 `store`로 쓴다.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn TimeSeriesStore>,
    ) -> Result<Self, CoreError> {
        let clients = config
            .transmission_clients
            .iter()
            .map(|client| -> Result<ClientHandle, CoreError> {
                let rpc = TransmissionRpcClient::new(client)?;
                debug!("Transmission 클라이언트 등록: {} ({})", client.display_name(), rpc.endpoint());
                Ok(ClientHandle {
                    config: client.clone(),
                    rpc: Arc::new(rpc) as Arc<dyn TorrentRpcClient>,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kv: Arc<dyn KeyValueStore> = Arc::new(WriteThroughKvStore::new(store.clone()));
        let aggregator = StatsAggregator::new(LedgerStore::new(kv));

        Ok(Self::new(
            clients,
            aggregator,
            store,
            config.collection_interval(),
        ))
    }

    /// 등록된 클라이언트 이름 목록
    pub fn client_names(&self) -> Vec<String> {
        self.clients.iter().map(|c| c.config.display_name()).collect()
    }

    /// 수집 주기
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 한 사이클 실행 — 기록된 포인트 수 반환
    pub async fn collect_once(&self) -> usize {
        let timestamp = Utc::now();
        let mut written = 0;

        for client in &self.clients {
            let name = client.config.display_name();

            let points = match self
                .aggregator
                .collect(&client.config, client.rpc.as_ref(), timestamp)
                .await
            {
                Ok(points) => points,
                Err(e @ CoreError::LedgerCorrupted { .. }) => {
                    error!("{name} 수집 중단 — {e}");
                    continue;
                }
                Err(e) => {
                    warn!("{name} 수집 실패: {e}");
                    continue;
                }
            };

            match self.sink.write_points(&points).await {
                Ok(()) => written += points.len(),
                Err(e) => warn!("{name} 포인트 {}개 쓰기 실패: {e}", points.len()),
            }
        }

        info!(
            "수집 사이클 완료: 클라이언트 {}개, 포인트 {written}개 기록",
            self.clients.len()
        );
        written
    }

    /// 종료 신호까지 수집 반복
    ///
    /// 사이클 도중에는 중단하지 않는다 (KV 삭제와 쓰기 사이에서 끊기지 않도록).
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("수집 루프 시작: 주기 {}초", self.interval.as_secs());

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            self.collect_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        info!("수집 루프 종료");
    }
}
