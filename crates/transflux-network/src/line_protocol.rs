//! InfluxDB line protocol 인코더.
//!
//! `measurement,tag=v field=1i,other="s" 1700000000000000000`
//!
//! - measurement: 쉼표, 공백, `\` 이스케이프
//! - 태그 키/값, 필드 키: 쉼표, `=`, 공백, `\` 이스케이프
//! - 문자열 필드: 큰따옴표로 감싸고 `"`와 `\` 이스케이프
//! - 정수 필드: `i` 접미사
//!
//! 빈 태그 값과 유한하지 않은 실수 필드는 서버가 거부하므로 생략한다.
//! 필드가 하나도 남지 않은 포인트는 줄을 만들지 않는다.

use transflux_core::models::point::{DataPoint, FieldValue};

/// 포인트 배치를 줄바꿈으로 구분된 line protocol 본문으로 인코딩
pub fn encode_batch(points: &[DataPoint]) -> String {
    points
        .iter()
        .filter_map(encode_point)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 포인트 한 개를 line protocol 한 줄로 인코딩 (필드가 없으면 None)
pub fn encode_point(point: &DataPoint) -> Option<String> {
    let fields: Vec<String> = point
        .fields
        .iter()
        .filter_map(|(key, value)| {
            encode_field_value(value).map(|v| format!("{}={v}", escape_key(key)))
        })
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(&point.measurement);
    for (key, value) in &point.tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(nanos) = point.timestamp.timestamp_nanos_opt() {
        line.push(' ');
        line.push_str(&nanos.to_string());
    }

    Some(line)
}

fn encode_field_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(v) => Some(format!("{v}i")),
        FieldValue::Float(v) if v.is_finite() => Some(format!("{v:?}")),
        FieldValue::Float(_) => None,
        FieldValue::Boolean(v) => Some(v.to_string()),
        FieldValue::String(v) => Some(format!("\"{}\"", escape_string(v))),
    }
}

fn escape_measurement(raw: &str) -> String {
    escape(raw, &[',', ' ', '\\'])
}

fn escape_key(raw: &str) -> String {
    escape(raw, &[',', '=', ' ', '\\'])
}

fn escape_string(raw: &str) -> String {
    escape(raw, &['"', '\\'])
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        // 줄바꿈은 레코드 구분자라 이스케이프할 수 없다
        let c = if matches!(c, '\n' | '\r') { ' ' } else { c };
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
