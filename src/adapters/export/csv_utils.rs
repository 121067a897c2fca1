//! CSV export of stored reports. Uses the `csv` crate for safe serialization.

use crate::domain::ReportRecord;
use chrono::SecondsFormat;
use serde::Serialize;

const HEADER: [&str; 7] = [
    "id",
    "timestamp",
    "title",
    "source",
    "is_fake",
    "confidence",
    "origin",
];

/// One exported row. Explanations and content stay out: they are long free text.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    timestamp: String,
    title: &'a str,
    source: &'a str,
    is_fake: bool,
    confidence: f64,
    origin: &'a str,
}

/// Convert reports to a CSV string with a header row.
///
/// Columns: `id,timestamp,title,source,is_fake,confidence,origin`. Titles are flattened
/// to a single line; the csv crate handles quoting of commas and quotes.
pub fn reports_to_csv(records: &[ReportRecord]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    // Serde writes the header with the first row; an empty export still gets one.
    if records.is_empty() {
        wtr.write_record(HEADER)?;
    }

    for r in records {
        let title = r.title.replace(['\n', '\r'], " ");
        wtr.serialize(CsvRow {
            id: r.id,
            timestamp: r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            title: &title,
            source: r.source.as_deref().unwrap_or(""),
            is_fake: r.is_fake,
            confidence: r.confidence,
            origin: r.origin.map(|o| o.as_str()).unwrap_or(""),
        })?;
    }

    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::other(e.to_string()))
    })?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Origin;
    use chrono::{TimeZone, Utc};

    fn record(title: &str, source: Option<&str>, origin: Option<Origin>) -> ReportRecord {
        ReportRecord {
            id: 7,
            title: title.to_string(),
            content: "body".to_string(),
            source: source.map(str::to_string),
            is_fake: true,
            confidence: 0.85,
            explanation: "why".to_string(),
            origin,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_reports_to_csv_basic() {
        let csv = reports_to_csv(&[record("Moon landing", Some("Blog"), Some(Origin::Structured))])
            .unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,timestamp,title,source,is_fake,confidence,origin")
        );
        assert_eq!(
            lines.next(),
            Some("7,2024-01-01T00:00:00Z,Moon landing,Blog,true,0.85,structured")
        );
    }

    #[test]
    fn test_reports_to_csv_quotes_and_newlines() {
        let csv = reports_to_csv(&[record("Hello, \"world\"\nagain", None, None)]).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("\"Hello, \"\"world\"\" again\""));
        assert!(csv.trim_end().ends_with("true,0.85,"));
    }

    #[test]
    fn test_reports_to_csv_empty_keeps_header() {
        assert_eq!(
            reports_to_csv(&[]).unwrap(),
            "id,timestamp,title,source,is_fake,confidence,origin\n"
        );
    }
}
