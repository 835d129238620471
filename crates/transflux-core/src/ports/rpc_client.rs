//! 토렌트 데몬 RPC 포트.
//!
//! 구현: `transflux-network` crate (Transmission JSON-RPC, reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::torrent::{SessionInfo, SessionStats, TorrentSnapshot};

/// 토렌트 데몬 RPC 클라이언트
#[async_trait]
pub trait TorrentRpcClient: Send + Sync {
    /// 세션 메타데이터 조회 (버전, 다운로드 디렉토리)
    async fn session_info(&self) -> Result<SessionInfo, CoreError>;

    /// 세션 전체 통계 조회
    async fn session_stats(&self) -> Result<SessionStats, CoreError>;

    /// 현재 토렌트 목록 조회
    async fn torrents(&self) -> Result<Vec<TorrentSnapshot>, CoreError>;

    /// 경로의 여유 공간 조회 (바이트)
    async fn free_space(&self, path: &str) -> Result<u64, CoreError>;
}
