//! 트래커별 누적 통계 원장.
//!
//! 클라이언트 → 트래커 → 토렌트 인스턴스 ID → {downloaded, uploaded}.
//! 삭제된 토렌트의 항목(고아 항목)도 정리하지 않으며 트래커 합계에 계속 반영된다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 토렌트 인스턴스 하나의 누적 바이트
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerLedgerEntry {
    /// 누적 다운로드 바이트
    pub downloaded: u64,
    /// 누적 업로드 바이트
    pub uploaded: u64,
}

/// 트래커 라벨 → 인스턴스 ID → 항목
pub type TrackerLedger = BTreeMap<String, BTreeMap<String, TrackerLedgerEntry>>;

/// 전체 원장 (모든 클라이언트가 하나의 키를 공유)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoricalLedger {
    clients: BTreeMap<String, TrackerLedger>,
}

impl HistoricalLedger {
    /// 빈 원장 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 클라이언트 항목이 없으면 빈 항목 생성
    pub fn ensure_client(&mut self, client_name: &str) -> &mut TrackerLedger {
        self.clients.entry(client_name.to_string()).or_default()
    }

    /// 인스턴스 항목 갱신 (기존 값을 덮어쓴다 — 누적이 아님)
    pub fn upsert(
        &mut self,
        client_name: &str,
        tracker: &str,
        instance_id: &str,
        entry: TrackerLedgerEntry,
    ) {
        self.ensure_client(client_name)
            .entry(tracker.to_string())
            .or_default()
            .insert(instance_id.to_string(), entry);
    }

    /// 클라이언트의 트래커 원장 조회
    pub fn client(&self, client_name: &str) -> Option<&TrackerLedger> {
        self.clients.get(client_name)
    }

    /// 인스턴스 항목 조회
    pub fn entry(
        &self,
        client_name: &str,
        tracker: &str,
        instance_id: &str,
    ) -> Option<&TrackerLedgerEntry> {
        self.clients
            .get(client_name)?
            .get(tracker)?
            .get(instance_id)
    }

    /// 클라이언트별 트래커 합계 (고아 항목 포함)
    pub fn tracker_totals(&self, client_name: &str) -> BTreeMap<String, TrackerLedgerEntry> {
        let Some(trackers) = self.clients.get(client_name) else {
            return BTreeMap::new();
        };

        trackers
            .iter()
            .map(|(tracker, instances)| {
                let total = instances.values().fold(TrackerLedgerEntry::default(), |acc, e| {
                    TrackerLedgerEntry {
                        downloaded: acc.downloaded.saturating_add(e.downloaded),
                        uploaded: acc.uploaded.saturating_add(e.uploaded),
                    }
                });
                (tracker.clone(), total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_instead_of_adding() {
        let mut ledger = HistoricalLedger::new();
        let first = TrackerLedgerEntry {
            downloaded: 100,
            uploaded: 10,
        };
        let second = TrackerLedgerEntry {
            downloaded: 150,
            uploaded: 20,
        };

        ledger.upsert("c1", "x.org", "id1", first);
        ledger.upsert("c1", "x.org", "id1", second);

        assert_eq!(ledger.entry("c1", "x.org", "id1"), Some(&second));
    }

    #[test]
    fn totals_include_every_instance() {
        let mut ledger = HistoricalLedger::new();
        ledger.upsert("c1", "x.org", "a", TrackerLedgerEntry { downloaded: 100, uploaded: 1 });
        ledger.upsert("c1", "x.org", "b", TrackerLedgerEntry { downloaded: 400, uploaded: 2 });
        ledger.upsert("c1", "y.net", "c", TrackerLedgerEntry { downloaded: 7, uploaded: 0 });
        ledger.upsert("c2", "x.org", "d", TrackerLedgerEntry { downloaded: 9999, uploaded: 0 });

        let totals = ledger.tracker_totals("c1");
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["x.org"].downloaded, 500);
        assert_eq!(totals["x.org"].uploaded, 3);
        assert_eq!(totals["y.net"].downloaded, 7);
        assert!(ledger.tracker_totals("missing").is_empty());
    }

    #[test]
    fn json_shape_is_nested_object() {
        let mut ledger = HistoricalLedger::new();
        ledger.upsert("c1", "x.org", "id1", TrackerLedgerEntry { downloaded: 1, uploaded: 2 });
        ledger.ensure_client("c2");

        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(
            json,
            r#"{"c1":{"x.org":{"id1":{"downloaded":1,"uploaded":2}}},"c2":{}}"#
        );
    }
}
