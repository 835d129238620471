//! 토렌트 데몬 스냅샷 모델.
//!
//! Transmission RPC 응답 스키마를 그대로 따른다. 필수 필드가 빠지면
//! 역직렬화가 실패하므로 RPC 경계에서 타입 검증이 끝난다.

use serde::{Deserialize, Serialize};

/// 세션 메타데이터 (`session-get`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionInfo {
    /// 데몬 버전 문자열 (예: "4.0.5 (a6fe2a64aa)")
    pub version: String,
    /// 기본 다운로드 디렉토리
    pub download_dir: String,
}

/// 세션 누적 통계 (`session-stats`의 `cumulative-stats`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeStats {
    /// 누적 다운로드 바이트
    pub downloaded_bytes: u64,
    /// 누적 업로드 바이트
    pub uploaded_bytes: u64,
}

/// 세션 전체 통계 (`session-stats`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// 활성 토렌트 수
    pub active_torrent_count: u64,
    /// 일시정지 토렌트 수
    pub paused_torrent_count: u64,
    /// 전체 토렌트 수
    pub torrent_count: u64,
    /// 현재 다운로드 속도 (bytes/sec)
    pub download_speed: u64,
    /// 현재 업로드 속도 (bytes/sec)
    pub upload_speed: u64,
    /// 데몬 수명 전체 누적 통계
    #[serde(rename = "cumulative-stats")]
    pub cumulative_stats: CumulativeStats,
}

/// 트래커 항목 (`trackers[]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerInfo {
    /// announce URL
    pub announce: String,
}

/// Transmission 토렌트 상태 코드 (0~6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TorrentStatus {
    /// 0: 정지
    Stopped,
    /// 1: 검사 대기
    CheckPending,
    /// 2: 검사 중
    Checking,
    /// 3: 다운로드 대기
    DownloadPending,
    /// 4: 다운로드 중
    Downloading,
    /// 5: 시딩 대기
    SeedPending,
    /// 6: 시딩 중
    Seeding,
}

impl From<i64> for TorrentStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::CheckPending,
            2 => Self::Checking,
            3 => Self::DownloadPending,
            4 => Self::Downloading,
            5 => Self::SeedPending,
            6 => Self::Seeding,
            // 알 수 없는 코드는 정지로 취급
            _ => Self::Stopped,
        }
    }
}

impl From<TorrentStatus> for i64 {
    fn from(status: TorrentStatus) -> Self {
        match status {
            TorrentStatus::Stopped => 0,
            TorrentStatus::CheckPending => 1,
            TorrentStatus::Checking => 2,
            TorrentStatus::DownloadPending => 3,
            TorrentStatus::Downloading => 4,
            TorrentStatus::SeedPending => 5,
            TorrentStatus::Seeding => 6,
        }
    }
}

/// 집계용 상태 분류 — 토렌트 하나는 정확히 하나의 분류에 속한다
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 검사 (카운터에 반영하지 않음)
    Checking,
    /// 다운로드
    Downloading,
    /// 시딩
    Seeding,
    /// 정지 (기타 상태 포함)
    Stopped,
}

impl TorrentStatus {
    /// `torrents` 포인트의 `status` 태그 값
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::CheckPending => "check pending",
            Self::Checking => "checking",
            Self::DownloadPending => "download pending",
            Self::Downloading => "downloading",
            Self::SeedPending => "seed pending",
            Self::Seeding => "seeding",
        }
    }

    /// 분류 순서: 검사 → 다운로드 → 시딩 → 정지
    pub fn classify(self) -> StatusClass {
        match self {
            Self::CheckPending | Self::Checking => StatusClass::Checking,
            Self::DownloadPending | Self::Downloading => StatusClass::Downloading,
            Self::SeedPending | Self::Seeding => StatusClass::Seeding,
            Self::Stopped => StatusClass::Stopped,
        }
    }
}

/// 토렌트 한 개의 순간 상태 (`torrent-get`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentSnapshot {
    /// infohash (hex)
    pub hash_string: String,
    /// 추가 시각 (unix seconds)
    pub added_date: i64,
    /// 토렌트 이름
    pub name: String,
    /// 상태 코드
    pub status: TorrentStatus,
    /// 에러 코드 (0 = 정상)
    pub error: i64,
    /// 연결된 피어 수
    pub peers_connected: u64,
    /// 다운로드 속도 (bytes/sec)
    pub rate_download: u64,
    /// 업로드 속도 (bytes/sec)
    pub rate_upload: u64,
    /// 이 인스턴스의 누적 다운로드 바이트
    pub downloaded_ever: u64,
    /// 이 인스턴스의 누적 업로드 바이트
    pub uploaded_ever: u64,
    /// 완료율 (0.0 ~ 1.0)
    pub percent_done: f64,
    /// 트래커 목록 (첫 항목이 기본 트래커)
    pub trackers: Vec<TrackerInfo>,
}

impl TorrentSnapshot {
    /// 기본 트래커 announce URL (트래커가 없으면 None)
    pub fn primary_announce(&self) -> Option<&str> {
        self.trackers.first().map(|t| t.announce.as_str())
    }

    /// 에러 상태 여부
    pub fn has_error(&self) -> bool {
        self.error != 0
    }
}
