//! Report service. Statistics, recent history, exports and imports over the report store.

use crate::adapters::export::reports_to_csv;
use crate::adapters::persistence::legacy_json::load_legacy_reports;
use crate::domain::statistics::{self, StatisticsSnapshot};
use crate::domain::{ConfidenceDistribution, DomainError, ReportQuery, ReportRecord, StatCount};
use crate::ports::ReportStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Width of the longest text bar in the digest.
const BAR_WIDTH: usize = 30;

/// Service over the stored report history.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    reports_dir: PathBuf,
}

impl ReportService {
    /// # Arguments
    /// * `store` - Report store implementation (SQLite, memory)
    /// * `reports_dir` - Directory for CSV exports and Markdown digests
    pub fn new(store: Arc<dyn ReportStore>, reports_dir: PathBuf) -> Self {
        Self { store, reports_dir }
    }

    /// Aggregate every stored report with a recency window of `days`.
    pub async fn compute_statistics(&self, days: u32) -> Result<StatisticsSnapshot, DomainError> {
        let records = self.store.query(&ReportQuery::all()).await?;
        let snapshot = statistics::compute(&records, days);
        info!(
            days,
            total = snapshot.total_count.total,
            recent = snapshot.recent_count.total,
            "statistics computed"
        );
        Ok(snapshot)
    }

    /// Newest reports first.
    ///
    /// # Errors
    /// `DomainError::InvalidInput` when `limit` is 0.
    pub async fn get_recent(
        &self,
        limit: usize,
        fake_only: bool,
    ) -> Result<Vec<ReportRecord>, DomainError> {
        if limit == 0 {
            return Err(DomainError::InvalidInput(
                "limit must be greater than zero".to_string(),
            ));
        }
        self.store
            .query(&ReportQuery::recent(limit, fake_only))
            .await
    }

    /// Write the newest `limit` reports to a CSV file in the reports directory.
    pub async fn export_csv(&self, limit: usize, fake_only: bool) -> Result<PathBuf, DomainError> {
        let records = self.get_recent(limit, fake_only).await?;
        let csv = reports_to_csv(&records)
            .map_err(|e| DomainError::Export(format!("Failed to generate CSV: {}", e)))?;

        self.ensure_reports_dir().await?;
        let filename = format!("reports_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.reports_dir.join(filename);
        fs::write(&path, csv)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to write CSV: {}", e)))?;

        info!(path = %path.display(), rows = records.len(), "CSV export written");
        Ok(path)
    }

    /// Write a Markdown statistics digest for the last `days` days.
    pub async fn write_digest(&self, days: u32) -> Result<PathBuf, DomainError> {
        let snapshot = self.compute_statistics(days).await?;
        let now = Utc::now();
        let md = render_digest(&snapshot, days, now);

        self.ensure_reports_dir().await?;
        let filename = format!("digest_{}d_{}.md", days, now.format("%Y%m%d_%H%M%S"));
        let path = self.reports_dir.join(filename);
        fs::write(&path, md)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to write digest: {}", e)))?;

        info!(path = %path.display(), "digest generated");
        Ok(path)
    }

    /// Import a legacy `reports.json` export in one batch. Returns the number imported.
    pub async fn import_legacy(&self, path: &Path) -> Result<usize, DomainError> {
        let reports = load_legacy_reports(path).await?;
        let ids = self.store.insert_batch(&reports).await?;
        info!(path = %path.display(), imported = ids.len(), "legacy import complete");
        Ok(ids.len())
    }

    async fn ensure_reports_dir(&self) -> Result<(), DomainError> {
        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to create reports dir: {}", e)))
    }
}

/// Render a snapshot as Markdown. Text bars stand in for charts.
pub fn render_digest(snapshot: &StatisticsSnapshot, days: u32, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# News Sentinel Digest\n\n");
    md.push_str(&format!(
        "**Window:** last {} day(s) | **Generated:** {}\n\n",
        days,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    md.push_str("---\n\n");

    md.push_str("## Overview\n\n");
    md.push_str("| | Real | Fake | Total | Fake share |\n");
    md.push_str("|---|---:|---:|---:|---:|\n");
    md.push_str(&count_row("All time", &snapshot.total_count));
    md.push_str(&count_row(&format!("Last {} day(s)", days), &snapshot.recent_count));
    md.push('\n');

    if !snapshot.by_source.is_empty() {
        md.push_str("## By Source\n\n");
        md.push_str("| Source | Real | Fake | Total | Fake share |\n");
        md.push_str("|---|---:|---:|---:|---:|\n");
        for (source, count) in &snapshot.by_source {
            md.push_str(&count_row(&source.replace('|', "/"), count));
        }
        md.push('\n');
    }

    let stats = &snapshot.confidence_stats;
    md.push_str("## Confidence\n\n");
    md.push_str(&format!(
        "Average **{:.2}**, min **{:.2}**, max **{:.2}**\n\n",
        stats.average, stats.min, stats.max
    ));
    md.push_str("```text\n");
    md.push_str(&render_bars(
        ConfidenceDistribution::LABELS
            .iter()
            .zip(ConfidenceDistribution::BANDS.iter())
            .map(|(range, band)| format!("{} {}", range, band))
            .zip(stats.distribution.counts()),
    ));
    md.push_str("```\n\n");

    if !snapshot.daily_counts.is_empty() {
        md.push_str("## Daily\n\n");
        md.push_str("```text\n");
        md.push_str(&render_daily(&snapshot.daily_counts));
        md.push_str("```\n\n");
    }

    md.push_str("---\n");
    md.push_str("*Generated by news-sentinel*\n");
    md
}

fn count_row(label: &str, count: &StatCount) -> String {
    format!(
        "| {} | {} | {} | {} | {:.0}% |\n",
        label,
        count.real,
        count.fake,
        count.total,
        count.fake_ratio() * 100.0
    )
}

/// Horizontal bars scaled to the largest count.
fn render_bars(rows: impl Iterator<Item = (String, u64)>) -> String {
    let rows: Vec<(String, u64)> = rows.collect();
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let peak = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut out = String::new();
    for (label, count) in rows {
        let len = if peak == 0 {
            0
        } else {
            ((count as f64 / peak as f64) * BAR_WIDTH as f64).round() as usize
        };
        out.push_str(&format!(
            "{:<width$} | {:<bar$} {}\n",
            label,
            "#".repeat(len),
            count,
            width = label_width,
            bar = BAR_WIDTH
        ));
    }
    out
}

/// Daily series in date order: real as `+`, fake as `x`.
fn render_daily(daily: &BTreeMap<String, StatCount>) -> String {
    let peak = daily.values().map(|c| c.total).max().unwrap_or(0);
    let mut out = String::new();
    for (date, count) in daily {
        let scale = |n: u64| -> usize {
            if peak == 0 {
                0
            } else {
                ((n as f64 / peak as f64) * BAR_WIDTH as f64).round() as usize
            }
        };
        out.push_str(&format!(
            "{} | {}{} real {} / fake {}\n",
            date,
            "+".repeat(scale(count.real)),
            "x".repeat(scale(count.fake)),
            count.real,
            count.fake
        ));
    }
    out
}
