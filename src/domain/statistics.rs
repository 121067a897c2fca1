//! Statistics aggregation over the report history.
//!
//! Pure and total: any record set (including an empty one) yields a snapshot.

use crate::domain::ReportRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket label for reports without a source.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Real/fake counts. `total` is always `real + fake`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCount {
    pub real: u64,
    pub fake: u64,
    pub total: u64,
}

impl StatCount {
    pub fn record(&mut self, is_fake: bool) {
        if is_fake {
            self.fake += 1;
        } else {
            self.real += 1;
        }
        self.total = self.real + self.fake;
    }

    /// Share of fake reports in [0, 1]; 0 when empty.
    pub fn fake_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.fake as f64 / self.total as f64
        }
    }
}

/// Five-bin confidence histogram. Bins are half-open except the last, which includes 1.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    #[serde(rename = "0.0-0.2")]
    pub highly_real: u64,
    #[serde(rename = "0.2-0.4")]
    pub somewhat_real: u64,
    #[serde(rename = "0.4-0.6")]
    pub uncertain: u64,
    #[serde(rename = "0.6-0.8")]
    pub somewhat_fake: u64,
    #[serde(rename = "0.8-1.0")]
    pub highly_fake: u64,
}

impl ConfidenceDistribution {
    pub const LABELS: [&'static str; 5] = ["0.0-0.2", "0.2-0.4", "0.4-0.6", "0.6-0.8", "0.8-1.0"];
    pub const BANDS: [&'static str; 5] = [
        "Highly Confident Real",
        "Somewhat Confident Real",
        "Uncertain",
        "Somewhat Confident Fake",
        "Highly Confident Fake",
    ];

    /// Bin index for a confidence value; `None` outside [0, 1] (and for NaN).
    pub fn bin_index(confidence: f64) -> Option<usize> {
        if !(0.0..=1.0).contains(&confidence) {
            return None;
        }
        let idx = if confidence < 0.2 {
            0
        } else if confidence < 0.4 {
            1
        } else if confidence < 0.6 {
            2
        } else if confidence < 0.8 {
            3
        } else {
            4
        };
        Some(idx)
    }

    pub fn add(&mut self, confidence: f64) {
        if let Some(idx) = Self::bin_index(confidence) {
            match idx {
                0 => self.highly_real += 1,
                1 => self.somewhat_real += 1,
                2 => self.uncertain += 1,
                3 => self.somewhat_fake += 1,
                _ => self.highly_fake += 1,
            }
        }
    }

    /// Counts in bin order.
    pub fn counts(&self) -> [u64; 5] {
        [
            self.highly_real,
            self.somewhat_real,
            self.uncertain,
            self.somewhat_fake,
            self.highly_fake,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub distribution: ConfidenceDistribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_count: StatCount,
    pub recent_count: StatCount,
    pub by_source: BTreeMap<String, StatCount>,
    pub confidence_stats: ConfidenceStats,
    /// `YYYY-MM-DD` (UTC) → counts. Only dates with reports appear.
    pub daily_counts: BTreeMap<String, StatCount>,
}

/// Aggregate `records` with a recency window of `days` ending now.
pub fn compute(records: &[ReportRecord], days: u32) -> StatisticsSnapshot {
    compute_at(records, days, Utc::now())
}

/// Aggregate `records` with a recency window of `days` ending at `now`.
pub fn compute_at(records: &[ReportRecord], days: u32, now: DateTime<Utc>) -> StatisticsSnapshot {
    // A window reaching past the calendar's start covers every record.
    let cutoff = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut snapshot = StatisticsSnapshot::default();

    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for record in records {
        snapshot.total_count.record(record.is_fake);
        if record.timestamp >= cutoff {
            snapshot.recent_count.record(record.is_fake);
        }

        snapshot
            .by_source
            .entry(source_label(record.source.as_deref()).to_string())
            .or_default()
            .record(record.is_fake);

        snapshot
            .daily_counts
            .entry(record.timestamp.format("%Y-%m-%d").to_string())
            .or_default()
            .record(record.is_fake);

        sum += record.confidence;
        min = min.min(record.confidence);
        max = max.max(record.confidence);
        snapshot
            .confidence_stats
            .distribution
            .add(record.confidence);
    }

    if !records.is_empty() {
        snapshot.confidence_stats.average = sum / records.len() as f64;
        snapshot.confidence_stats.min = min;
        snapshot.confidence_stats.max = max;
    }

    snapshot
}

fn source_label(source: Option<&str>) -> &str {
    match source.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => UNKNOWN_SOURCE,
    }
}
