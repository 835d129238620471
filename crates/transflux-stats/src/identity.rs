//! 토렌트 인스턴스 식별자.
//!
//! 같은 infohash라도 삭제 후 다시 추가하면 추가 시각이 달라지므로
//! 별개의 인스턴스로 취급된다. 프로세스별 salt가 없어 재시작 후에도 같은 값이 나온다.

use sha2::{Digest, Sha256};

/// 인스턴스 ID 길이 (hex 32자 = 128비트)
const INSTANCE_ID_HEX_LEN: usize = 32;

/// `instance_id(infohash, added_date)` — SHA-256 앞 128비트의 소문자 hex
pub fn instance_id(infohash: &str, added_date: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(infohash.as_bytes());
    // 구분자로 (infohash, 시각) 경계를 고정한다
    hasher.update(b":");
    hasher.update(added_date.to_string().as_bytes());

    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(INSTANCE_ID_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deterministic() {
        assert_eq!(instance_id("abc", 1_700_000_000), instance_id("abc", 1_700_000_000));
    }

    #[test]
    fn known_value_is_stable() {
        // 저장된 원장과의 호환성: 값이 바뀌면 기존 이력이 새 인스턴스로 분리된다
        assert_eq!(instance_id("abc", 0), "5f36efce86f68877cee18fda5637abb2");
        assert_eq!(
            instance_id("abc", 1_700_000_000),
            "bd3c65e40382f265264d55f094fd93b4"
        );
        assert_eq!(instance_id("abc", 0).len(), INSTANCE_ID_HEX_LEN);
    }

    #[test]
    fn added_date_changes_id() {
        assert_ne!(instance_id("abc", 1), instance_id("abc", 2));
    }

    #[test]
    fn boundary_is_not_ambiguous() {
        assert_ne!(instance_id("ab", 12), instance_id("ab1", 2));
    }

    #[test]
    fn injective_over_sample_domain() {
        let hashes = ["abc", "abd", "0123456789abcdef0123456789abcdef01234567"];
        let mut ids = HashSet::new();
        for hash in hashes {
            for added in [0_i64, 1, 1_700_000_000, -5] {
                assert!(ids.insert(instance_id(hash, added)));
            }
        }
        assert_eq!(ids.len(), 12);
    }
}
