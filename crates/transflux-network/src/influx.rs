//! InfluxDB v1 HTTP 클라이언트.
//!
//! `TimeSeriesStore` 포트 구현.
//! 첫 호출 때 연결을 확인하고 데이터베이스와 보존 정책을 준비한다 (성공할 때까지 매 호출 재시도).
//! - `GET /ping` (204, `X-Influxdb-Version`)
//! - `SHOW DATABASES` → 없으면 `CREATE DATABASE`
//! - `SHOW RETENTION POLICIES` → 없으면 무기한 기본 정책 생성
//!
//! 쓰기는 `POST /write` (line protocol), 조회/삭제는 `POST /query`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use transflux_core::config::InfluxConfig;
use transflux_core::error::CoreError;
use transflux_core::models::point::{DataPoint, FieldValue};
use transflux_core::ports::time_series::TimeSeriesStore;
use tracing::{debug, info};

use crate::line_protocol;

/// 기본 보존 정책 이름
pub const RETENTION_POLICY: &str = "transmission_exporter_retention";

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Series {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl QueryResponse {
    /// 첫 statement 결과 (에러가 있으면 Store 에러)
    fn into_first(self, query: &str) -> Result<StatementResult, CoreError> {
        if let Some(error) = self.error {
            return Err(CoreError::Store(format!("{query}: {error}")));
        }
        let first = self.results.into_iter().next().unwrap_or_default();
        if let Some(error) = &first.error {
            return Err(CoreError::Store(format!("{query}: {error}")));
        }
        Ok(first)
    }
}

impl StatementResult {
    /// 첫 시리즈에서 `column` 열의 문자열 값 목록
    fn column_strings(&self, column: &str) -> Vec<String> {
        let Some(series) = self.series.first() else {
            return Vec::new();
        };
        let index = series.columns.iter().position(|c| c == column).unwrap_or(0);
        series
            .values
            .iter()
            .filter_map(|row| row.get(index).and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

/// InfluxDB v1 클라이언트
pub struct InfluxClient {
    client: reqwest::Client,
    base_url: String,
    database: String,
    credentials: Option<(String, String)>,
    ready: OnceCell<()>,
}

impl InfluxClient {
    /// 설정으로 클라이언트 생성
    pub fn new(config: &InfluxConfig) -> Result<Self, CoreError> {
        Self::with_base_url(config, &config.base_url())
    }

    /// 기본 URL을 직접 지정해 생성
    pub fn with_base_url(config: &InfluxConfig, base_url: &str) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.use_ssl && !config.verify_ssl)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        let credentials = (!config.username.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            credentials,
            ready: OnceCell::new(),
        })
    }

    /// 준비 작업이 끝났는지 여부
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    fn auth_params(&self) -> Vec<(&str, &str)> {
        match &self.credentials {
            Some((user, password)) => vec![("u", user.as_str()), ("p", password.as_str())],
            None => Vec::new(),
        }
    }

    async fn ensure_ready(&self) -> Result<(), CoreError> {
        self.ready.get_or_try_init(|| self.bootstrap()).await?;
        Ok(())
    }

    async fn bootstrap(&self) -> Result<(), CoreError> {
        info!("InfluxDB 연결: {}", self.base_url);

        let resp = self
            .client
            .get(format!("{}/ping", self.base_url))
            .query(&self.auth_params())
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("InfluxDB ping 실패: {e}")))?;
        let resp = check_response(resp).await?;
        let version = resp
            .headers()
            .get("x-influxdb-version")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        debug!("InfluxDB 버전: {version}");

        let db = quote_ident(&self.database);

        let databases = self.query("SHOW DATABASES", false).await?;
        if !databases.column_strings("name").contains(&self.database) {
            info!("데이터베이스 생성: {}", self.database);
            self.query(&format!("CREATE DATABASE {db}"), false).await?;
        }

        let policies = self
            .query(&format!("SHOW RETENTION POLICIES ON {db}"), false)
            .await?;
        if !policies
            .column_strings("name")
            .iter()
            .any(|name| name == RETENTION_POLICY)
        {
            info!("보존 정책 생성: {} ({RETENTION_POLICY})", self.database);
            self.query(
                &format!(
                    "CREATE RETENTION POLICY {} ON {db} DURATION INF REPLICATION 1 SHARD DURATION 1h DEFAULT",
                    quote_ident(RETENTION_POLICY)
                ),
                false,
            )
            .await?;
        }

        Ok(())
    }

    /// InfluxQL 실행 (`with_db`면 `db` 파라미터 포함)
    async fn query(&self, query: &str, with_db: bool) -> Result<StatementResult, CoreError> {
        let mut form = vec![("q", query)];
        if with_db {
            form.push(("db", self.database.as_str()));
        }

        let resp = self
            .client
            .post(format!("{}/query", self.base_url))
            .query(&self.auth_params())
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("InfluxDB 쿼리 요청 실패: {e}")))?;
        let resp = check_response(resp).await?;

        let body: QueryResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::decode("influxdb query", e))?;
        body.into_first(query)
    }
}

#[async_trait]
impl TimeSeriesStore for InfluxClient {
    async fn write_points(&self, points: &[DataPoint]) -> Result<(), CoreError> {
        let body = line_protocol::encode_batch(points);
        if body.is_empty() {
            return Ok(());
        }
        self.ensure_ready().await?;

        let mut params = vec![("db", self.database.as_str()), ("precision", "ns")];
        params.extend(self.auth_params());

        let resp = self
            .client
            .post(format!("{}/write", self.base_url))
            .query(&params)
            .body(body)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("InfluxDB 쓰기 요청 실패: {e}")))?;
        check_response(resp).await?;

        debug!("InfluxDB 포인트 {}개 쓰기", points.len());
        Ok(())
    }

    async fn drop_measurement(&self, measurement: &str) -> Result<(), CoreError> {
        self.ensure_ready().await?;

        let query = format!("DROP MEASUREMENT {}", quote_ident(measurement));
        match self.query(&query, true).await {
            Ok(_) => Ok(()),
            Err(CoreError::Store(message)) if message.contains("measurement not found") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn last_value(
        &self,
        measurement: &str,
        field: &str,
    ) -> Result<Option<FieldValue>, CoreError> {
        self.ensure_ready().await?;

        let query = format!(
            "SELECT last({}) FROM {}",
            quote_ident(field),
            quote_ident(measurement)
        );
        let result = self.query(&query, true).await?;

        // 행 구성: [time, last]
        let value = result
            .series
            .first()
            .and_then(|s| s.values.first())
            .and_then(|row| row.get(1))
            .and_then(field_value);
        Ok(value)
    }
}

/// 응답 상태 코드 확인 및 에러 매핑
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Err(CoreError::Auth(format!("InfluxDB 인증 실패: {text}"))),
        404 => Err(CoreError::NotFound {
            resource_type: "InfluxDB".to_string(),
            id: text,
        }),
        503 => Err(CoreError::ServiceUnavailable(text)),
        _ => Err(CoreError::Store(format!("InfluxDB 에러 ({status}): {text}"))),
    }
}

/// InfluxQL 식별자 인용
fn quote_ident(raw: &str) -> String {
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}

fn field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::String(s.clone())),
        Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Float)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;
    use serde_json::json;
    use transflux_core::config::AppConfig;

    fn config() -> InfluxConfig {
        AppConfig::default_config().influxdb
    }

    fn client_for(server: &mockito::ServerGuard, config: &InfluxConfig) -> InfluxClient {
        InfluxClient::with_base_url(config, &server.url()).unwrap()
    }

    fn query_mock(server: &mut mockito::ServerGuard, q: &str, body: Value) -> mockito::Mock {
        server
            .mock("POST", "/query")
            .match_query(Matcher::Any)
            .match_body(Matcher::UrlEncoded("q".into(), q.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    fn ok_result() -> Value {
        json!({ "results": [{ "statement_id": 0 }] })
    }

    fn names(columns: &[&str], rows: Vec<Value>) -> Value {
        json!({ "results": [{ "statement_id": 0, "series": [{ "columns": columns, "values": rows }] }] })
    }

    /// 데이터베이스와 보존 정책이 이미 있는 서버
    async fn mock_ready_server(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
        vec![
            server
                .mock("GET", "/ping")
                .match_query(Matcher::Any)
                .with_status(204)
                .with_header("X-Influxdb-Version", "1.8.10")
                .create_async()
                .await,
            query_mock(
                server,
                "SHOW DATABASES",
                names(&["name"], vec![json!(["_internal"]), json!(["transmission"])]),
            )
            .create_async()
            .await,
            query_mock(
                server,
                "SHOW RETENTION POLICIES ON \"transmission\"",
                names(
                    &["name", "duration", "shardGroupDuration", "replicaN", "default"],
                    vec![json!([RETENTION_POLICY, "0s", "1h0m0s", 1, true])],
                ),
            )
            .create_async()
            .await,
        ]
    }

    fn point() -> DataPoint {
        DataPoint::new("stats", Utc.timestamp_opt(1, 0).unwrap())
            .tag("client_name", "c1")
            .field("seeding", 2_i64)
    }

    #[tokio::test]
    async fn bootstrap_creates_database_and_policy_once() {
        let mut server = mockito::Server::new_async().await;
        let ping = server
            .mock("GET", "/ping")
            .with_status(204)
            .with_header("X-Influxdb-Version", "1.8.10")
            .expect(1)
            .create_async()
            .await;
        let _show_db = query_mock(&mut server, "SHOW DATABASES", names(&["name"], vec![json!(["_internal"])]))
            .create_async()
            .await;
        let create_db = query_mock(&mut server, "CREATE DATABASE \"transmission\"", ok_result())
            .expect(1)
            .create_async()
            .await;
        let _show_rp = query_mock(
            &mut server,
            "SHOW RETENTION POLICIES ON \"transmission\"",
            names(&["name"], vec![json!(["autogen"])]),
        )
        .create_async()
        .await;
        let create_rp = query_mock(
            &mut server,
            "CREATE RETENTION POLICY \"transmission_exporter_retention\" ON \"transmission\" DURATION INF REPLICATION 1 SHARD DURATION 1h DEFAULT",
            ok_result(),
        )
        .expect(1)
        .create_async()
        .await;
        let write = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, &config());
        assert!(!client.is_ready());
        client.write_points(&[point()]).await.unwrap();
        client.write_points(&[point()]).await.unwrap();
        assert!(client.is_ready());

        ping.assert_async().await;
        create_db.assert_async().await;
        create_rp.assert_async().await;
        write.assert_async().await;
    }

    #[tokio::test]
    async fn existing_database_is_not_recreated() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let create = server
            .mock("POST", "/query")
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex("CREATE".into()))
            .expect(0)
            .create_async()
            .await;
        let _write = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .with_status(204)
            .create_async()
            .await;

        client_for(&server, &config()).write_points(&[point()]).await.unwrap();
        create.assert_async().await;
    }

    #[tokio::test]
    async fn write_sends_line_protocol_with_precision() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let write = server
            .mock("POST", "/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("db".into(), "transmission".into()),
                Matcher::UrlEncoded("precision".into(), "ns".into()),
            ]))
            .match_body("stats,client_name=c1 seeding=2i 1000000000")
            .with_status(204)
            .create_async()
            .await;

        client_for(&server, &config()).write_points(&[point()]).await.unwrap();
        write.assert_async().await;
    }

    #[tokio::test]
    async fn credentials_are_sent_as_query_params() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let write = server
            .mock("POST", "/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("u".into(), "admin".into()),
                Matcher::UrlEncoded("p".into(), "secret".into()),
            ]))
            .with_status(204)
            .create_async()
            .await;

        let mut config = config();
        config.username = "admin".to_string();
        config.password = "secret".to_string();

        client_for(&server, &config).write_points(&[point()]).await.unwrap();
        write.assert_async().await;
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        let client = InfluxClient::with_base_url(&config(), "http://127.0.0.1:1").unwrap();
        client.write_points(&[]).await.unwrap();
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn last_value_reads_second_column() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let _m = query_mock(
            &mut server,
            "SELECT last(\"value\") FROM \"ledger\"",
            names(&["time", "last"], vec![json!(["2024-01-01T00:00:00Z", "{\"c1\":{}}"])]),
        )
        .create_async()
        .await;
        let _empty = query_mock(
            &mut server,
            "SELECT last(\"value\") FROM \"missing\"",
            ok_result(),
        )
        .create_async()
        .await;

        let client = client_for(&server, &config());
        assert_eq!(
            client.last_value("ledger", "value").await.unwrap(),
            Some(FieldValue::from("{\"c1\":{}}"))
        );
        assert_eq!(client.last_value("missing", "value").await.unwrap(), None);
    }

    #[tokio::test]
    async fn drop_tolerates_missing_measurement() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let drop = query_mock(
            &mut server,
            "DROP MEASUREMENT \"ledger\"",
            json!({ "results": [{ "statement_id": 0, "error": "measurement not found" }] }),
        )
        .expect(1)
        .create_async()
        .await;

        client_for(&server, &config()).drop_measurement("ledger").await.unwrap();
        drop.assert_async().await;
    }

    #[tokio::test]
    async fn statement_error_is_store_error() {
        let mut server = mockito::Server::new_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let _m = query_mock(
            &mut server,
            "SELECT last(\"value\") FROM \"ledger\"",
            json!({ "results": [{ "statement_id": 0, "error": "database not found: transmission" }] }),
        )
        .create_async()
        .await;

        let err = client_for(&server, &config())
            .last_value("ledger", "value")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Store(ref m) if m.contains("database not found")));
    }

    #[tokio::test]
    async fn unauthorized_ping_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _ping = server
            .mock("GET", "/ping")
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server, &config())
            .write_points(&[point()])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Auth(_)));
    }

    #[tokio::test]
    async fn failed_bootstrap_is_retried_on_next_call() {
        let mut server = mockito::Server::new_async().await;
        let down = server
            .mock("GET", "/ping")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server, &config());
        assert!(matches!(
            client.drop_measurement("k").await,
            Err(CoreError::ServiceUnavailable(_))
        ));
        assert!(!client.is_ready());

        down.remove_async().await;
        let _ready = mock_ready_server(&mut server).await;
        let _drop = query_mock(&mut server, "DROP MEASUREMENT \"k\"", ok_result())
            .create_async()
            .await;

        client.drop_measurement("k").await.unwrap();
        assert!(client.is_ready());
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("stats"), "\"stats\"");
        assert_eq!(quote_ident(r#"we"ird\name"#), r#""we\"ird\\name""#);
    }

    #[test]
    fn json_values_map_to_field_values() {
        assert_eq!(field_value(&json!(3)), Some(FieldValue::Integer(3)));
        assert_eq!(field_value(&json!(0.5)), Some(FieldValue::Float(0.5)));
        assert_eq!(field_value(&json!("s")), Some(FieldValue::from("s")));
        assert_eq!(field_value(&json!(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(field_value(&Value::Null), None);
    }
}
