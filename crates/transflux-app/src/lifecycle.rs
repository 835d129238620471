//! 라이프사이클 관리.
//!
//! 시그널 핸들링과 수집 루프 종료 신호 전파.

use tokio::sync::watch;
use tracing::{info, warn};

/// 라이프사이클 관리자
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LifecycleManager {
    /// 새 라이프사이클 관리자 생성
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    /// 종료 수신기 복제
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// 종료 신호 발송
    pub fn shutdown(&self) {
        info!("종료 신호 발송");
        let _ = self.shutdown_tx.send(true);
    }

    /// OS 시그널 대기 (SIGINT, SIGTERM) 후 종료 신호 발송
    ///
    /// 핸들러 등록에 실패해도 종료 신호는 발송된다.
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        let result = Self::recv_signal().await;
        if let Err(e) = &result {
            warn!("시그널 핸들러 등록 실패: {e}");
        }
        self.shutdown();
        result
    }

    #[cfg(unix)]
    async fn recv_signal() -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => info!("SIGINT 수신"),
            _ = sigterm.recv() => info!("SIGTERM 수신"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn recv_signal() -> std::io::Result<()> {
        tokio::signal::ctrl_c().await?;
        info!("Ctrl+C 수신");
        Ok(())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
