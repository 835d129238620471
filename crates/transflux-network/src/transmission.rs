//! Transmission JSON-RPC 클라이언트.
//!
//! `TorrentRpcClient` 포트 구현. CSRF 세션 ID 핸드셰이크를 처리한다:
//! 데몬이 409와 함께 `X-Transmission-Session-Id`를 돌려주면 저장하고 한 번 재시도한다.
//! 저장된 ID는 이후 요청에 재사용된다.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use transflux_core::config::ClientConfig;
use transflux_core::error::CoreError;
use transflux_core::models::torrent::{SessionInfo, SessionStats, TorrentSnapshot};
use transflux_core::ports::rpc_client::TorrentRpcClient;
use tracing::debug;

/// CSRF 세션 헤더
const SESSION_HEADER: &str = "x-transmission-session-id";

/// `torrent-get`으로 요청하는 필드 (TorrentSnapshot 스키마와 일치)
const TORRENT_FIELDS: [&str; 12] = [
    "hashString",
    "addedDate",
    "name",
    "status",
    "error",
    "peersConnected",
    "rateDownload",
    "rateUpload",
    "downloadedEver",
    "uploadedEver",
    "percentDone",
    "trackers",
];

#[derive(Deserialize)]
struct RpcEnvelope {
    result: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct TorrentList {
    torrents: Vec<TorrentSnapshot>,
}

#[derive(Deserialize)]
struct FreeSpace {
    #[serde(rename = "size-bytes")]
    size_bytes: u64,
}

/// Transmission RPC 클라이언트 — 데몬 하나당 하나
pub struct TransmissionRpcClient {
    client: reqwest::Client,
    name: String,
    endpoint: String,
    credentials: Option<(String, String)>,
    session_id: Mutex<Option<String>>,
}

impl TransmissionRpcClient {
    /// 설정으로 클라이언트 생성 (`rpc_verified_tls`면 https)
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let scheme = if config.rpc_verified_tls { "https" } else { "http" };
        let endpoint = format!(
            "{scheme}://{}:{}{}",
            config.rpc_addr, config.rpc_port, config.rpc_path
        );
        Self::with_endpoint(config, &endpoint)
    }

    /// 엔드포인트 URL을 직접 지정해 생성
    pub fn with_endpoint(config: &ClientConfig, endpoint: &str) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        let credentials = (!config.rpc_user.is_empty())
            .then(|| (config.rpc_user.clone(), config.rpc_password.clone()));

        Ok(Self {
            client,
            name: config.display_name(),
            endpoint: endpoint.to_string(),
            credentials,
            session_id: Mutex::new(None),
        })
    }

    /// RPC 엔드포인트 URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, CoreError> {
        let mut request = self.client.post(&self.endpoint).json(body);

        let session_id = self.session_id.lock().clone();
        if let Some(id) = session_id {
            request = request.header(SESSION_HEADER, id);
        }
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        request
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("{} RPC 요청 실패: {e}", self.name)))
    }

    /// RPC 호출 — 409면 세션 ID를 갱신하고 한 번 재시도
    async fn call<T: DeserializeOwned>(&self, method: &str, arguments: Value) -> Result<T, CoreError> {
        let body = json!({ "method": method, "arguments": arguments });

        let mut response = self.send(&body).await?;
        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    CoreError::Rpc(format!("{}: 409 응답에 세션 ID 헤더가 없습니다", self.name))
                })?;

            debug!("{} RPC 세션 ID 갱신", self.name);
            *self.session_id.lock() = Some(session_id);
            response = self.send(&body).await?;
        }

        let response = self.check_response(response).await?;
        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| CoreError::decode(method, e))?;

        if envelope.result != "success" {
            return Err(CoreError::Rpc(format!(
                "{} {method}: {}",
                self.name, envelope.result
            )));
        }

        serde_json::from_value(envelope.arguments).map_err(|e| CoreError::decode(method, e))
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(CoreError::Auth(format!("{} RPC 인증 실패 ({status})", self.name))),
            404 => Err(CoreError::NotFound {
                resource_type: "RPC".to_string(),
                id: self.endpoint.clone(),
            }),
            503 => Err(CoreError::ServiceUnavailable(format!("{}: {text}", self.name))),
            _ => Err(CoreError::Rpc(format!("{} HTTP {status}: {text}", self.name))),
        }
    }
}

#[async_trait]
impl TorrentRpcClient for TransmissionRpcClient {
    async fn session_info(&self) -> Result<SessionInfo, CoreError> {
        self.call("session-get", json!({ "fields": ["version", "download-dir"] }))
            .await
    }

    async fn session_stats(&self) -> Result<SessionStats, CoreError> {
        self.call("session-stats", json!({})).await
    }

    async fn torrents(&self) -> Result<Vec<TorrentSnapshot>, CoreError> {
        let list: TorrentList = self
            .call("torrent-get", json!({ "fields": TORRENT_FIELDS }))
            .await?;
        debug!("{} 토렌트 {}개 조회", self.name, list.torrents.len());
        Ok(list.torrents)
    }

    async fn free_space(&self, path: &str) -> Result<u64, CoreError> {
        let space: FreeSpace = self.call("free-space", json!({ "path": path })).await?;
        Ok(space.size_bytes)
    }
}
