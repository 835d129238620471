//! 사이클 단위 통계 집계기.
//!
//! 폴링 한 번의 데몬 스냅샷과 누적 통계 원장을 합쳐 포인트를 만든다.
//!
//! 1. 세션 통계로 클라이언트 누적기 초기화
//! 2. 토렌트마다: 트래커 추출(실패 시 제외) → 원장 갱신 → 상태/에러/속도/피어 집계
//! 3. 원장 저장 (사이클당 한 번)
//! 4. 원장의 모든 인스턴스(고아 포함)를 트래커별 누적 바이트로 합산
//! 5. `torrents`(선택) → `trackers` → `stats` 순으로 출력
//!
//! 속도·피어·상태 카운트는 매 사이클 새로 계산하고, 트래커 누적 바이트만 원장에서 온다.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use transflux_core::config::ClientConfig;
use transflux_core::error::CoreError;
use transflux_core::models::ledger::TrackerLedgerEntry;
use transflux_core::models::point::DataPoint;
use transflux_core::models::torrent::{SessionInfo, SessionStats, StatusClass, TorrentSnapshot};
use transflux_core::ports::rpc_client::TorrentRpcClient;
use transflux_storage::ledger::LedgerStore;
use tracing::{debug, info, warn};

use crate::identity::instance_id;
use crate::tracker::primary_tracker;

/// 클라이언트 통계 measurement
pub const STATS_MEASUREMENT: &str = "stats";
/// 트래커 통계 measurement
pub const TRACKERS_MEASUREMENT: &str = "trackers";
/// 토렌트별 통계 measurement
pub const TORRENTS_MEASUREMENT: &str = "torrents";

/// 폴링 한 번에 데몬에서 가져온 스냅샷
#[derive(Debug, Clone)]
pub struct DaemonSnapshot {
    /// 세션 메타데이터
    pub session: SessionInfo,
    /// 세션 전체 통계
    pub stats: SessionStats,
    /// 다운로드 디렉토리 여유 공간 (바이트)
    pub free_space: u64,
    /// 현재 토렌트 목록
    pub torrents: Vec<TorrentSnapshot>,
}

impl DaemonSnapshot {
    /// RPC 클라이언트에서 스냅샷 수집
    pub async fn fetch(rpc: &dyn TorrentRpcClient) -> Result<Self, CoreError> {
        let session = rpc.session_info().await?;
        let stats = rpc.session_stats().await?;
        let free_space = rpc.free_space(&session.download_dir).await?;
        let torrents = rpc.torrents().await?;

        Ok(Self {
            session,
            stats,
            free_space,
            torrents,
        })
    }
}

/// 매 사이클 새로 계산되는 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LiveCounters {
    seeding: u64,
    downloading: u64,
    stopped: u64,
    errored: u64,
    connected_peers: u64,
    download_speed: u64,
    upload_speed: u64,
}

impl LiveCounters {
    fn observe(&mut self, torrent: &TorrentSnapshot, class: StatusClass) {
        match class {
            // 검사 중인 토렌트는 어느 카운터에도 넣지 않는다
            StatusClass::Checking => {}
            StatusClass::Downloading => self.downloading += 1,
            StatusClass::Seeding => self.seeding += 1,
            StatusClass::Stopped => self.stopped += 1,
        }

        if torrent.has_error() {
            self.errored += 1;
        }

        self.connected_peers += torrent.peers_connected;
        self.download_speed += torrent.rate_download;
        self.upload_speed += torrent.rate_upload;
    }
}

/// 트래커 누적기
#[derive(Debug, Clone, Copy, Default)]
struct TrackerAccumulator {
    live: LiveCounters,
    totals: TrackerLedgerEntry,
}

/// 통계 집계기 — 원장 핸들을 소유하는 사이클 컨텍스트
pub struct StatsAggregator {
    ledger: LedgerStore,
    /// 모든 클라이언트가 원장 키 하나를 공유하므로 load→갱신→save를 직렬화한다
    cycle_lock: Mutex<()>,
}

impl StatsAggregator {
    /// 새 집계기 생성
    pub fn new(ledger: LedgerStore) -> Self {
        Self {
            ledger,
            cycle_lock: Mutex::new(()),
        }
    }

    /// 클라이언트 한 개의 사이클 실행: 스냅샷 수집 → 집계
    pub async fn collect(
        &self,
        client: &ClientConfig,
        rpc: &dyn TorrentRpcClient,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<DataPoint>, CoreError> {
        let client_name = client.display_name();
        debug!("Transmission 클라이언트 수집 시작: {client_name}");

        let snapshot = DaemonSnapshot::fetch(rpc).await?;
        self.aggregate(
            &client_name,
            client.collect_individual_torrents,
            &snapshot,
            timestamp,
        )
        .await
    }

    /// 스냅샷과 원장을 합쳐 포인트 생성 (원장은 여기서 한 번 저장된다)
    pub async fn aggregate(
        &self,
        client_name: &str,
        include_torrents: bool,
        snapshot: &DaemonSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<DataPoint>, CoreError> {
        let _guard = self.cycle_lock.lock().await;
        let mut ledger = self.ledger.load(client_name).await?;

        let mut client_live = LiveCounters::default();
        let mut trackers: BTreeMap<String, TrackerAccumulator> = BTreeMap::new();
        let mut points = Vec::new();
        let mut recorded = 0usize;

        for torrent in &snapshot.torrents {
            let Some(tracker) = primary_tracker(torrent) else {
                warn!(
                    "트래커 추출 실패, 토렌트 제외: client={client_name}, name={}, announce={:?}",
                    torrent.name,
                    torrent.primary_announce()
                );
                continue;
            };

            let accumulator = trackers.entry(tracker.clone()).or_default();

            let id = instance_id(&torrent.hash_string, torrent.added_date);
            ledger.upsert(
                client_name,
                &tracker,
                &id,
                TrackerLedgerEntry {
                    downloaded: torrent.downloaded_ever,
                    uploaded: torrent.uploaded_ever,
                },
            );

            let class = torrent.status.classify();
            accumulator.live.observe(torrent, class);
            client_live.observe(torrent, class);

            if include_torrents {
                points.push(torrent_point(client_name, &tracker, torrent, timestamp));
            }
            recorded += 1;
        }

        self.ledger.save(&ledger).await?;

        for (tracker, totals) in ledger.tracker_totals(client_name) {
            trackers.entry(tracker).or_default().totals = totals;
        }

        points.extend(
            trackers
                .iter()
                .map(|(tracker, acc)| tracker_point(client_name, tracker, acc, timestamp)),
        );
        points.push(stats_point(client_name, snapshot, &client_live, timestamp));

        info!(
            "Transmission 클라이언트 {client_name}: 토렌트 {recorded}/{}개 기록, 트래커 {}개",
            snapshot.torrents.len(),
            trackers.len()
        );
        Ok(points)
    }
}

fn torrent_point(
    client_name: &str,
    tracker: &str,
    torrent: &TorrentSnapshot,
    timestamp: DateTime<Utc>,
) -> DataPoint {
    DataPoint::new(TORRENTS_MEASUREMENT, timestamp)
        .tag("client_name", client_name)
        .tag("infohash", torrent.hash_string.as_str())
        .tag("torrent_name", torrent.name.as_str())
        .tag("tracker", tracker)
        .tag("error", torrent.error.to_string())
        .tag("status", torrent.status.as_str())
        .field("downloaded", torrent.downloaded_ever)
        .field("uploaded", torrent.uploaded_ever)
        .field("download_speed", torrent.rate_download)
        .field("upload_speed", torrent.rate_upload)
        .field("connected_peers", torrent.peers_connected)
        .field("percent_done", torrent.percent_done)
}

fn tracker_point(
    client_name: &str,
    tracker: &str,
    acc: &TrackerAccumulator,
    timestamp: DateTime<Utc>,
) -> DataPoint {
    DataPoint::new(TRACKERS_MEASUREMENT, timestamp)
        .tag("client_name", client_name)
        .tag("tracker", tracker)
        .field("downloaded", acc.totals.downloaded)
        .field("uploaded", acc.totals.uploaded)
        .field("download_speed", acc.live.download_speed)
        .field("upload_speed", acc.live.upload_speed)
        .field("connected_peers", acc.live.connected_peers)
        .field("seeding", acc.live.seeding)
        .field("downloading", acc.live.downloading)
        .field("stopped", acc.live.stopped)
        .field("errored", acc.live.errored)
}

/// 클라이언트 통계 — 누적 바이트/속도/토렌트 수는 세션 통계, 상태·피어는 토렌트 집계
fn stats_point(
    client_name: &str,
    snapshot: &DaemonSnapshot,
    live: &LiveCounters,
    timestamp: DateTime<Utc>,
) -> DataPoint {
    let stats = &snapshot.stats;
    DataPoint::new(STATS_MEASUREMENT, timestamp)
        .tag("client_name", client_name)
        .tag("version", snapshot.session.version.as_str())
        .field("free_space", snapshot.free_space)
        .field("downloaded", stats.cumulative_stats.downloaded_bytes)
        .field("uploaded", stats.cumulative_stats.uploaded_bytes)
        .field("torrents", stats.torrent_count)
        .field("download_speed", stats.download_speed)
        .field("upload_speed", stats.upload_speed)
        .field("seeding", live.seeding)
        .field("downloading", live.downloading)
        .field("errored", live.errored)
        .field("stopped", live.stopped)
        .field("connected_peers", live.connected_peers)
}
