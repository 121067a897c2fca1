//! In-memory ReportStore. For `storage = "memory"` sessions and tests.
//!
//! Reports live for the process lifetime only.

use crate::domain::{DomainError, NewReport, ReportQuery, ReportRecord};
use crate::ports::ReportStore;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreData {
    next_id: i64,
    records: Vec<ReportRecord>,
}

/// Append-only vector behind an async RwLock. Ids start at 1.
#[derive(Default)]
pub struct MemoryReportStore {
    data: RwLock<StoreData>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.records.is_empty()
    }
}

#[async_trait::async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &NewReport) -> Result<i64, DomainError> {
        let mut data = self.data.write().await;
        data.next_id += 1;
        let id = data.next_id;
        data.records.push(ReportRecord::from_new(id, report.clone()));
        Ok(id)
    }

    async fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRecord>, DomainError> {
        let data = self.data.read().await;
        let mut matching: Vec<ReportRecord> = data
            .records
            .iter()
            .filter(|r| !query.fake_only || r.is_fake)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn report(title: &str, is_fake: bool, minutes: i64) -> NewReport {
        NewReport {
            title: title.to_string(),
            content: String::new(),
            source: None,
            is_fake,
            confidence: 0.5,
            explanation: String::new(),
            origin: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn test_query_orders_newest_first_with_id_tiebreak() {
        let store = MemoryReportStore::new();
        store.insert(&report("late", false, 10)).await.unwrap();
        store.insert(&report("early", true, 0)).await.unwrap();
        store.insert(&report("late-2", true, 10)).await.unwrap();

        let all = store.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["late-2", "late", "early"]
        );
        assert_eq!(all[0].id, 3);
    }

    #[tokio::test]
    async fn test_fake_only_with_limit() {
        let store = MemoryReportStore::new();
        store
            .insert_batch(&[report("a", true, 0), report("b", false, 1), report("c", true, 2)])
            .await
            .unwrap();
        let fakes = store.query(&ReportQuery::recent(1, true)).await.unwrap();
        assert_eq!(fakes.len(), 1);
        assert_eq!(fakes[0].title, "c");
        assert_eq!(store.len().await, 3);
    }
}
