//! 시계열 데이터 포인트 모델.
//!
//! 하나의 measurement에 속한 태그/필드 집합. 태그 키와 필드 키는 서로 겹치지 않는다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 필드 값 (정수, 실수, 문자열, 불리언)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 정수 (line protocol `i` 접미사)
    Integer(i64),
    /// 실수
    Float(f64),
    /// 문자열
    String(String),
    /// 불리언
    Boolean(bool),
}

impl FieldValue {
    /// 정수 값 반환 (정수가 아니면 None)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// 실수 값 반환 (정수는 실수로 변환)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// 문자열 값 반환 (문자열이 아니면 None)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        Self::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// 단일 시계열 데이터 포인트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// measurement 이름 (같은 스키마의 포인트를 묶는다)
    pub measurement: String,
    /// 포인트 시각
    pub timestamp: DateTime<Utc>,
    /// 태그 (인덱싱되는 문자열)
    pub tags: BTreeMap<String, String>,
    /// 필드 (측정값)
    pub fields: BTreeMap<String, FieldValue>,
}

impl DataPoint {
    /// 태그/필드가 비어 있는 포인트 생성
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            timestamp,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// 태그 추가
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        debug_assert!(!self.fields.contains_key(&key), "태그/필드 키 중복: {key}");
        self.tags.insert(key, value.into());
        self
    }

    /// 필드 추가
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        debug_assert!(!self.tags.contains_key(&key), "태그/필드 키 중복: {key}");
        self.fields.insert(key, value.into());
        self
    }

    /// 태그 조회
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// 정수 필드 조회
    pub fn int_field(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(FieldValue::as_i64)
    }

    /// 태그 키와 필드 키가 겹치지 않는지 확인
    pub fn keys_disjoint(&self) -> bool {
        self.tags.keys().all(|k| !self.fields.contains_key(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_tags_and_fields() {
        let point = DataPoint::new("stats", Utc::now())
            .tag("client_name", "c1")
            .field("seeding", 3_i64)
            .field("percent_done", 0.5);

        assert_eq!(point.tag_value("client_name"), Some("c1"));
        assert_eq!(point.int_field("seeding"), Some(3));
        assert_eq!(
            point.fields.get("percent_done").and_then(FieldValue::as_f64),
            Some(0.5)
        );
        assert!(point.keys_disjoint());
    }

    #[test]
    fn u64_field_saturates() {
        assert_eq!(FieldValue::from(u64::MAX), FieldValue::Integer(i64::MAX));
        assert_eq!(FieldValue::from(42_u64), FieldValue::Integer(42));
    }
}
