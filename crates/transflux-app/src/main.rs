//! # transflux
//!
//! TRANSFLUX 수집기 바이너리 진입점.
//! 설정 로드, 로깅 초기화, 어댑터 와이어링 후 수집 루프를 실행한다.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transflux_app::collector::Collector;
use transflux_app::dry_run::LoggingStore;
use transflux_app::lifecycle::LifecycleManager;
use transflux_core::config_manager::ConfigManager;
use transflux_core::ports::time_series::TimeSeriesStore;
use transflux_network::influx::InfluxClient;
use transflux_storage::ledger::LEDGER_KEY;
use transflux_storage::memory::MemoryTimeSeriesStore;

/// Transmission → InfluxDB 통계 수집기
#[derive(Parser, Debug)]
#[command(name = "transflux")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: ./config.json → 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 한 사이클만 수집하고 종료
    #[arg(long)]
    once: bool,

    /// InfluxDB 대신 인메모리 저장소 사용 (포인트는 로그로 출력)
    #[arg(long)]
    dry_run: bool,
}

/// 워크스페이스 크레이트 전체에 로그 레벨 적용
fn log_filter(level: &str) -> String {
    [
        "transflux",
        "transflux_app",
        "transflux_core",
        "transflux_stats",
        "transflux_storage",
        "transflux_network",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&args.log_level))),
        )
        .init();

    info!("TRANSFLUX 수집기 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let config_path = ConfigManager::resolve_path(args.config.as_deref());
    let config_manager = ConfigManager::load(config_path).context("설정 로드 실패")?;
    let config = config_manager.get();

    let store: Arc<dyn TimeSeriesStore> = if args.dry_run {
        info!("dry-run 모드: InfluxDB로 전송하지 않습니다");
        Arc::new(LoggingStore::new(Arc::new(MemoryTimeSeriesStore::new())).quiet(LEDGER_KEY))
    } else {
        Arc::new(InfluxClient::new(&config.influxdb).context("InfluxDB 클라이언트 생성 실패")?)
    };

    let collector =
        Arc::new(Collector::from_config(config, store).context("수집기 와이어링 실패")?);
    info!("수집 대상: {}", collector.client_names().join(", "));

    if args.once {
        let written = collector.collect_once().await;
        info!("단일 사이클 종료: 포인트 {written}개");
        return Ok(());
    }

    let lifecycle = LifecycleManager::new();
    let shutdown_rx = lifecycle.subscribe();
    let collector_task = tokio::spawn({
        let collector = collector.clone();
        async move { collector.run(shutdown_rx).await }
    });

    info!("TRANSFLUX 수집기 실행 중 (Ctrl+C로 종료)");
    let signal_result = lifecycle.wait_for_signal().await;

    collector_task.await.context("수집 루프 태스크 실패")?;
    signal_result.context("시그널 대기 실패")?;

    info!("TRANSFLUX 수집기 종료");
    Ok(())
}
