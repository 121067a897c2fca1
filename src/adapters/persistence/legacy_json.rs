//! Reads a legacy `reports.json` export (array of report objects).
//!
//! Old exports carry their own `id` (discarded: the store assigns a new one) and often
//! naive timestamps without an offset; those are taken as UTC.

use crate::domain::entities::{clamp_confidence, truncate_content};
use crate::domain::{DomainError, NewReport};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::info;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Deserialize)]
struct LegacyReport {
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    source: Option<String>,
    is_fake: bool,
    confidence: f64,
    #[serde(default)]
    explanation: String,
    timestamp: String,
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Decode a legacy export held in memory.
///
/// # Errors
/// `DomainError::Import` on malformed JSON or an unparseable timestamp (the whole file is
/// rejected so a partial import never happens).
pub fn parse_legacy_reports(json: &str) -> Result<Vec<NewReport>, DomainError> {
    let legacy: Vec<LegacyReport> = serde_json::from_str(json)
        .map_err(|e| DomainError::Import(format!("invalid legacy report JSON: {}", e)))?;

    legacy
        .into_iter()
        .enumerate()
        .map(|(idx, r)| {
            let timestamp = parse_timestamp(&r.timestamp).ok_or_else(|| {
                DomainError::Import(format!(
                    "report #{} has unparseable timestamp {:?}",
                    idx, r.timestamp
                ))
            })?;
            Ok(NewReport {
                title: r.title,
                content: truncate_content(&r.content),
                source: r.source.filter(|s| !s.trim().is_empty()),
                is_fake: r.is_fake,
                confidence: clamp_confidence(r.confidence),
                explanation: r.explanation,
                origin: None,
                timestamp,
            })
        })
        .collect()
}

/// Read and decode a legacy export file.
pub async fn load_legacy_reports(path: &Path) -> Result<Vec<NewReport>, DomainError> {
    let json = fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Import(format!("read {}: {}", path.display(), e)))?;
    let reports = parse_legacy_reports(&json)?;
    info!(path = %path.display(), count = reports.len(), "legacy reports loaded");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 0).unwrap();
        assert_eq!(parse_timestamp("2024-02-29T13:45:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-02-29T15:45:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-02-29T13:45:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-02-29 13:45:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_legacy_reports() {
        let json = r#"[
            {"id": "abc", "title": "Old one", "content": "x", "source": "", "is_fake": true,
             "confidence": 1.2, "explanation": "e", "timestamp": "2023-11-05T10:00:00.123456"},
            {"title": "Older", "is_fake": false, "confidence": 0.2,
             "timestamp": "2023-11-04T09:00:00+00:00"}
        ]"#;
        let reports = parse_legacy_reports(json).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].source, None);
        assert_eq!(reports[0].confidence, 1.0);
        assert_eq!(reports[0].origin, None);
        assert_eq!(reports[1].explanation, "");
    }

    #[test]
    fn test_bad_timestamp_rejects_file() {
        let json = r#"[{"title": "t", "is_fake": false, "confidence": 0.2, "timestamp": "soon"}]"#;
        let err = parse_legacy_reports(json).unwrap_err();
        assert!(matches!(err, DomainError::Import(msg) if msg.contains("#0")));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_legacy_reports(Path::new("/nonexistent/reports.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Import(_)));
    }
}
