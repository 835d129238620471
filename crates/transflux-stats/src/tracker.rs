//! 트래커 라벨 추출.
//!
//! `https://tracker.example.com:6969/announce` → `example.com`.
//! 지원 스킴: http, https, tcp, udp. 선행 `tracker.` 라벨과 포트는 제거한다.

use transflux_core::models::torrent::TorrentSnapshot;
use url::Url;

/// 트래커 URL로 허용하는 스킴
const SUPPORTED_SCHEMES: [&str; 4] = ["http", "https", "tcp", "udp"];

/// announce URL에서 트래커 라벨 추출 (형식이 맞지 않으면 None)
pub fn extract_tracker(announce: &str) -> Option<String> {
    let url = Url::parse(announce.trim()).ok()?;
    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return None;
    }

    // 특수 스킴이 아니면 url이 호스트를 소문자로 바꾸지 않는다
    let host = url.host_str()?.to_ascii_lowercase();
    let label = host.strip_prefix("tracker.").unwrap_or(&host);
    if label.is_empty() {
        return None;
    }

    Some(label.to_string())
}

/// 토렌트의 기본 트래커 라벨 (트래커가 없거나 URL이 잘못되면 None)
pub fn primary_tracker(torrent: &TorrentSnapshot) -> Option<String> {
    torrent.primary_announce().and_then(extract_tracker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracker_prefix_and_port() {
        assert_eq!(
            extract_tracker("https://tracker.example.com:6969/announce").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            extract_tracker("udp://tracker.x.org:80/announce").as_deref(),
            Some("x.org")
        );
    }

    #[test]
    fn keeps_host_without_prefix() {
        assert_eq!(
            extract_tracker("http://open.tracker.io/announce?passkey=1").as_deref(),
            Some("open.tracker.io")
        );
        assert_eq!(extract_tracker("tcp://bt.example.net:1337").as_deref(), Some("bt.example.net"));
    }

    #[test]
    fn host_case_does_not_split_labels() {
        for announce in [
            "HTTP://TRACKER.X.ORG/announce",
            "UDP://TRACKER.X.ORG:80/announce",
            "udp://Tracker.X.org:80",
            "tcp://tracker.x.org",
        ] {
            assert_eq!(extract_tracker(announce).as_deref(), Some("x.org"), "{announce}");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        assert_eq!(extract_tracker("not-a-url"), None);
        assert_eq!(extract_tracker(""), None);
        assert_eq!(extract_tracker("tracker.example.com:6969/announce"), None);
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert_eq!(extract_tracker("wss://tracker.example.com/announce"), None);
        assert_eq!(extract_tracker("magnet:?xt=urn:btih:abc"), None);
    }
}
