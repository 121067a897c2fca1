//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/SQL types here; adapters map into and out of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters of article content kept in a stored report.
pub const STORED_CONTENT_CHARS: usize = 500;

/// Marker appended to stored content that was cut at [`STORED_CONTENT_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

/// An article submitted for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub title: String,
    pub content: String,
}

impl ClassificationRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Where a classification verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Decoded from a JSON object returned by the remote model.
    Structured,
    /// Scraped from remote model text that did not decode.
    HeuristicParse,
    /// Produced locally because every credential was rate limited.
    Fallback,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Structured => "structured",
            Origin::HeuristicParse => "heuristic_parse",
            Origin::Fallback => "fallback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "structured" => Some(Origin::Structured),
            "heuristic_parse" => Some(Origin::HeuristicParse),
            "fallback" => Some(Origin::Fallback),
            _ => None,
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one [`ClassificationRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub is_fake: bool,
    /// Nominally in [0, 1]; remote output is not validated here.
    pub confidence: f64,
    pub explanation: String,
    pub origin: Origin,
}

impl ClassificationResult {
    /// True when the verdict did not come from the remote model.
    pub fn is_degraded(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

/// A report about to be inserted. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub is_fake: bool,
    pub confidence: f64,
    pub explanation: String,
    pub origin: Option<Origin>,
    pub timestamp: DateTime<Utc>,
}

impl NewReport {
    /// Build a storable report from a classification. Content is truncated and
    /// confidence clamped to [0, 1] here, at ingestion.
    pub fn from_classification(
        title: &str,
        content: &str,
        source: Option<String>,
        result: &ClassificationResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.to_string(),
            content: truncate_content(content),
            source: normalize_source(source),
            is_fake: result.is_fake,
            confidence: clamp_confidence(result.confidence),
            explanation: result.explanation.clone(),
            origin: Some(result.origin),
            timestamp,
        }
    }
}

/// A stored, immutable report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub is_fake: bool,
    pub confidence: f64,
    pub explanation: String,
    pub origin: Option<Origin>,
    pub timestamp: DateTime<Utc>,
}

impl ReportRecord {
    pub fn from_new(id: i64, report: NewReport) -> Self {
        Self {
            id,
            title: report.title,
            content: report.content,
            source: report.source,
            is_fake: report.is_fake,
            confidence: report.confidence,
            explanation: report.explanation,
            origin: report.origin,
            timestamp: report.timestamp,
        }
    }
}

/// Filter for [`crate::ports::ReportStore::query`]. Results are always newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub fake_only: bool,
    /// `None` = no limit.
    pub limit: Option<usize>,
}

impl ReportQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn recent(limit: usize, fake_only: bool) -> Self {
        Self {
            fake_only,
            limit: Some(limit),
        }
    }
}

/// Keep the first [`STORED_CONTENT_CHARS`] characters, marking the cut.
pub fn truncate_content(content: &str) -> String {
    match content.char_indices().nth(STORED_CONTENT_CHARS) {
        Some((byte_idx, _)) => format!("{}{}", &content[..byte_idx], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// NaN has no meaningful position on the scale; it maps to the uncertain midpoint.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.5
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

fn normalize_source(source: Option<String>) -> Option<String> {
    source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_content_untouched() {
        assert_eq!(truncate_content("short"), "short");
        let exact = "a".repeat(STORED_CONTENT_CHARS);
        assert_eq!(truncate_content(&exact), exact);
    }

    #[test]
    fn test_truncate_long_content_counts_chars() {
        let long = "é".repeat(STORED_CONTENT_CHARS + 10);
        let stored = truncate_content(&long);
        assert!(stored.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            stored.chars().count(),
            STORED_CONTENT_CHARS + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn test_from_classification_clamps_and_normalizes() {
        let result = ClassificationResult {
            is_fake: true,
            confidence: 1.7,
            explanation: "why".to_string(),
            origin: Origin::Structured,
        };
        let report = NewReport::from_classification(
            "t",
            "c",
            Some("   ".to_string()),
            &result,
            Utc::now(),
        );
        assert_eq!(report.confidence, 1.0);
        assert_eq!(report.source, None);
        assert_eq!(report.origin, Some(Origin::Structured));
    }

    #[test]
    fn test_clamp_confidence_nan() {
        assert_eq!(clamp_confidence(f64::NAN), 0.5);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
    }

    #[test]
    fn test_origin_round_trip_names() {
        for origin in [Origin::Structured, Origin::HeuristicParse, Origin::Fallback] {
            assert_eq!(Origin::parse(origin.as_str()), Some(origin));
        }
        assert_eq!(Origin::parse("gemini"), None);
    }
}
