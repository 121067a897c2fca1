//! SQLite-backed report store via libsql. Implements ReportStore.
//!
//! Single append-only `reports` table; rows are never updated or deleted.
//! Timestamps are stored as UTC microseconds so ordering is a plain integer sort.
//! All reports share one database file: data/reports.db

use crate::domain::{DomainError, NewReport, Origin, ReportQuery, ReportRecord};
use crate::ports::ReportStore;
use chrono::{DateTime, Utc};
use libsql::{Database, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REPORTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    source TEXT,
    is_fake INTEGER NOT NULL,
    confidence REAL NOT NULL,
    explanation TEXT NOT NULL DEFAULT '',
    origin TEXT,
    timestamp INTEGER NOT NULL
)"#;
const REPORTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reports_timestamp ON reports (timestamp DESC)";

const INSERT_REPORT: &str = r#"
INSERT INTO reports (title, content, source, is_fake, confidence, explanation, origin, timestamp)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

/// SQLite report store. One database file (reports.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL so readers (statistics) never block the
    /// writer (new detections).
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Store(e.to_string()))?;
        let db_path = base.join("reports.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Store(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Store(format!("{} failed: {}", pragma, e)))?;
            while rows
                .next()
                .await
                .map_err(|e| DomainError::Store(e.to_string()))?
                .is_some()
            {}
        }

        conn.execute(REPORTS_TABLE, ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        conn.execute(REPORTS_INDEX, ())
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        info!(path = %db_path.display(), "SQLite report store connected (WAL mode)");

        Ok(Self { db, db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connection(&self) -> Result<libsql::Connection, DomainError> {
        self.db
            .connect()
            .map_err(|e| DomainError::Store(e.to_string()))
    }

    fn row_to_record(row: &libsql::Row) -> Result<ReportRecord, DomainError> {
        let id: i64 = row.get(0).map_err(|e| DomainError::Store(e.to_string()))?;
        let title: String = row.get::<String>(1).unwrap_or_default();
        let content: String = row.get::<String>(2).unwrap_or_default();
        let source: Option<String> = row.get(3).ok();
        let is_fake: i64 = row.get(4).map_err(|e| DomainError::Store(e.to_string()))?;
        let confidence: f64 = row.get(5).map_err(|e| DomainError::Store(e.to_string()))?;
        let explanation: String = row.get::<String>(6).unwrap_or_default();
        let origin: Option<String> = row.get(7).ok();
        let micros: i64 = row.get(8).map_err(|e| DomainError::Store(e.to_string()))?;
        let timestamp = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
            DomainError::Store(format!("report {} has invalid timestamp {}", id, micros))
        })?;
        Ok(ReportRecord {
            id,
            title,
            content,
            source,
            is_fake: is_fake != 0,
            confidence,
            explanation,
            origin: origin.as_deref().and_then(Origin::parse),
            timestamp,
        })
    }
}

#[async_trait::async_trait]
impl ReportStore for SqliteRepo {
    async fn insert(&self, report: &NewReport) -> Result<i64, DomainError> {
        let conn = self.connection()?;
        conn.execute(
            INSERT_REPORT,
            params![
                report.title.as_str(),
                report.content.as_str(),
                report.source.clone(),
                report.is_fake as i64,
                report.confidence,
                report.explanation.as_str(),
                report.origin.map(|o| o.as_str()),
                report.timestamp.timestamp_micros()
            ],
        )
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;
        let id = conn.last_insert_rowid();
        debug!(id, is_fake = report.is_fake, "report stored");
        Ok(id)
    }

    async fn insert_batch(&self, reports: &[NewReport]) -> Result<Vec<i64>, DomainError> {
        if reports.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.connection()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut ids = Vec::with_capacity(reports.len());
        for report in reports {
            tx.execute(
                INSERT_REPORT,
                params![
                    report.title.as_str(),
                    report.content.as_str(),
                    report.source.clone(),
                    report.is_fake as i64,
                    report.confidence,
                    report.explanation.as_str(),
                    report.origin.map(|o| o.as_str()),
                    report.timestamp.timestamp_micros()
                ],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        info!(count = ids.len(), "report batch stored");
        Ok(ids)
    }

    async fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRecord>, DomainError> {
        let conn = self.connection()?;
        // LIMIT -1 means "no limit" in SQLite.
        let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
        let fake_filter = if query.fake_only { 1 } else { 0 };
        let mut rows = conn
            .query(
                r#"
                SELECT id, title, content, source, is_fake, confidence, explanation, origin, timestamp
                FROM reports
                WHERE (?1 = 0 OR is_fake = 1)
                ORDER BY timestamp DESC, id DESC
                LIMIT ?2
                "#,
                params![fake_filter, limit],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            records.push(Self::row_to_record(&row)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn report(title: &str, is_fake: bool, minutes: i64) -> NewReport {
        NewReport {
            title: title.to_string(),
            content: "body".to_string(),
            source: if is_fake { None } else { Some("Wire".to_string()) },
            is_fake,
            confidence: if is_fake { 0.9 } else { 0.1 },
            explanation: "because".to_string(),
            origin: Some(Origin::Structured),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn test_insert_and_query_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        let first = repo.insert(&report("old", false, 0)).await.unwrap();
        let second = repo.insert(&report("new", true, 30)).await.unwrap();
        assert!(second > first);

        let all = repo.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["new", "old"]
        );
        assert_eq!(all[0].source, None);
        assert_eq!(all[1].source.as_deref(), Some("Wire"));
        assert_eq!(all[0].origin, Some(Origin::Structured));
        assert_eq!(all[0].timestamp, report("new", true, 30).timestamp);
    }

    #[tokio::test]
    async fn test_query_fake_only_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        repo.insert_batch(&[
            report("a", true, 0),
            report("b", false, 1),
            report("c", true, 2),
            report("d", true, 3),
        ])
        .await
        .unwrap();

        let fakes = repo.query(&ReportQuery::recent(2, true)).await.unwrap();
        assert_eq!(
            fakes.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
            vec!["d", "c"]
        );
        assert!(fakes.iter().all(|r| r.is_fake));

        let all = repo.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_reopen_keeps_reports() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = SqliteRepo::connect(dir.path()).await.unwrap();
            repo.insert(&report("kept", false, 0)).await.unwrap();
        }
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let all = repo.query(&ReportQuery::all()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "kept");
    }
}
