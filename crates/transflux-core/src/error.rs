//! TRANSFLUX 핵심 에러 타입.
//!
//! 모든 포트 구현체는 `CoreError`를 반환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, 네트워크, RPC, 시계열 저장소 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 — {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 인증 실패 (RPC 자격증명, InfluxDB 계정)
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "RPC", "InfluxDB")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 서비스 일시 불가 (503)
    #[error("서비스 일시 불가: {0}")]
    ServiceUnavailable(String),

    /// 토렌트 데몬이 RPC 요청을 거부함 (`result != "success"`)
    #[error("RPC 에러: {0}")]
    Rpc(String),

    /// RPC 응답 스키마 불일치 (필드 누락, 타입 오류)
    #[error("응답 디코딩 실패 — {context}: {message}")]
    Decode {
        /// 디코딩 대상 (예: "torrent-get")
        context: String,
        /// 실패 사유
        message: String,
    },

    /// 시계열 저장소 에러 (쓰기/조회/삭제 실패)
    #[error("시계열 저장소 에러: {0}")]
    Store(String),

    /// 누적 통계 원장이 손상됨 — 빈 원장으로 대체하지 않는다
    #[error("누적 통계 원장 손상 (key={key}): {message}")]
    LedgerCorrupted {
        /// 원장이 저장된 KV 키
        key: String,
        /// 디코딩 실패 사유
        message: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// `Decode` 에러 생성 헬퍼
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// `Validation` 에러 생성 헬퍼
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
