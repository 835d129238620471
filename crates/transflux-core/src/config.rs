//! 애플리케이션 설정 구조체.
//!
//! 수집 주기, InfluxDB 연결, Transmission 클라이언트 목록을 정의한다.
//! 키 이름은 기존 `config.json` 형식과 호환된다.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 수집 주기 (초)
    pub seconds_between_collections: u64,
    /// InfluxDB 연결 설정
    pub influxdb: InfluxConfig,
    /// 폴링할 Transmission 데몬 목록
    pub transmission_clients: Vec<ClientConfig>,
}

/// InfluxDB 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// 호스트 주소
    pub host_addr: String,
    /// 포트
    pub host_port: u16,
    /// HTTPS 사용 여부
    pub use_ssl: bool,
    /// 인증서 검증 여부
    pub verify_ssl: bool,
    /// 데이터베이스 이름
    pub database: String,
    /// 사용자 이름
    pub username: String,
    /// 비밀번호
    pub password: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_influx_timeout_secs")]
    pub timeout_secs: u64,
}

impl InfluxConfig {
    /// 기본 URL (예: "http://localhost:8086")
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host_addr, self.host_port)
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Transmission 클라이언트 설정 — 생성 후 변경하지 않는다
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 클라이언트 이름 (없으면 "주소:포트")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// RPC 호스트 주소
    pub rpc_addr: String,
    /// RPC 포트
    pub rpc_port: u16,
    /// RPC 경로 (예: "/transmission/rpc")
    pub rpc_path: String,
    /// RPC 사용자
    pub rpc_user: String,
    /// RPC 비밀번호
    pub rpc_password: String,
    /// HTTPS + 인증서 검증 사용 여부
    pub rpc_verified_tls: bool,
    /// RPC 타임아웃 (초)
    pub rpc_timeout: u64,
    /// 토렌트별 포인트 수집 여부
    #[serde(default)]
    pub collect_individual_torrents: bool,
}

impl ClientConfig {
    /// 태그와 원장 키로 쓰이는 클라이언트 이름
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.rpc_addr, self.rpc_port))
    }

    /// RPC 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout)
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환 (로컬 InfluxDB + 로컬 Transmission 데몬)
    pub fn default_config() -> Self {
        Self {
            seconds_between_collections: default_seconds_between_collections(),
            influxdb: InfluxConfig {
                host_addr: "localhost".to_string(),
                host_port: 8086,
                use_ssl: false,
                verify_ssl: false,
                database: "transmission".to_string(),
                username: String::new(),
                password: String::new(),
                timeout_secs: default_influx_timeout_secs(),
            },
            transmission_clients: vec![ClientConfig {
                name: None,
                rpc_addr: "localhost".to_string(),
                rpc_port: 9091,
                rpc_path: "/transmission/rpc".to_string(),
                rpc_user: String::new(),
                rpc_password: String::new(),
                rpc_verified_tls: false,
                rpc_timeout: 10,
                collect_individual_torrents: false,
            }],
        }
    }

    /// 수집 주기를 Duration으로 반환
    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.seconds_between_collections)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.seconds_between_collections == 0 {
            return Err(CoreError::validation(
                "seconds_between_collections",
                "0보다 커야 합니다",
            ));
        }

        let influx = &self.influxdb;
        if influx.host_addr.trim().is_empty() {
            return Err(CoreError::validation("influxdb.host_addr", "비어 있습니다"));
        }
        if influx.host_port == 0 {
            return Err(CoreError::validation("influxdb.host_port", "0일 수 없습니다"));
        }
        if influx.database.trim().is_empty() {
            return Err(CoreError::validation("influxdb.database", "비어 있습니다"));
        }
        if influx.timeout_secs == 0 {
            return Err(CoreError::validation(
                "influxdb.timeout_secs",
                "0보다 커야 합니다",
            ));
        }

        if self.transmission_clients.is_empty() {
            return Err(CoreError::validation(
                "transmission_clients",
                "설정된 Transmission 클라이언트가 없습니다",
            ));
        }

        let mut names = HashSet::new();
        for (i, client) in self.transmission_clients.iter().enumerate() {
            let field = |name: &str| format!("transmission_clients[{i}].{name}");

            if client.rpc_addr.trim().is_empty() {
                return Err(CoreError::validation(field("rpc_addr"), "비어 있습니다"));
            }
            if client.rpc_port == 0 {
                return Err(CoreError::validation(field("rpc_port"), "0일 수 없습니다"));
            }
            if !client.rpc_path.starts_with('/') {
                return Err(CoreError::validation(
                    field("rpc_path"),
                    "'/'로 시작해야 합니다",
                ));
            }
            if client.rpc_timeout == 0 {
                return Err(CoreError::validation(field("rpc_timeout"), "0보다 커야 합니다"));
            }

            let name = client.display_name();
            if name.trim().is_empty() {
                return Err(CoreError::validation(field("name"), "비어 있습니다"));
            }
            if !names.insert(name.clone()) {
                return Err(CoreError::validation(
                    field("name"),
                    format!("클라이언트 이름 중복: {name}"),
                ));
            }
        }

        Ok(())
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_seconds_between_collections() -> u64 {
    60
}

fn default_influx_timeout_secs() -> u64 {
    30
}
