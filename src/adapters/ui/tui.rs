//! Implements InputPort. Inquire-based interactive menu.
//!
//! Each menu entry maps to one use case call; failures are printed and the menu resumes.

use crate::adapters::ui::progress::with_spinner;
use crate::domain::statistics::StatisticsSnapshot;
use crate::domain::{ConfidenceDistribution, DomainError, ReportRecord};
use crate::ports::InputPort;
use crate::usecases::{Detection, DetectionService, ReportService};
use async_trait::async_trait;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, CustomType, Select, Text};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

const CHECK_ARTICLE: &str = "Check an article";
const CHECK_FILE: &str = "Check a text file";
const DEEP_ANALYSIS: &str = "Deep analysis";
const STATISTICS: &str = "Statistics";
const RECENT: &str = "Recent reports";
const EXPORT_CSV: &str = "Export reports (CSV)";
const DIGEST: &str = "Write statistics digest";
const IMPORT: &str = "Import legacy reports.json";
const EXIT: &str = "Exit";

/// Applies the prompt theme globally.
pub fn apply_theme() {
    let config = RenderConfig::default()
        .with_prompt_prefix(Styled::new("?").with_fg(Color::LightRed))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(Color::LightGreen))
        .with_answered_prompt_prefix(Styled::new("✔").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

/// Outcome of a prompt: a value, or the user backed out (Esc / Ctrl-C).
fn prompt_value<T>(res: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(DomainError::InvalidInput(e.to_string())),
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    detection: Arc<DetectionService>,
    reports: Arc<ReportService>,
    default_days: u32,
    default_limit: usize,
}

impl TuiInputPort {
    pub fn new(
        detection: Arc<DetectionService>,
        reports: Arc<ReportService>,
        default_days: u32,
        default_limit: usize,
    ) -> Self {
        Self {
            detection,
            reports,
            default_days,
            default_limit,
        }
    }

    async fn check_article(&self) -> Result<(), DomainError> {
        let Some(title) = prompt_value(Text::new("Headline:").prompt())? else {
            return Ok(());
        };
        let Some(content) = prompt_value(Text::new("Article text:").prompt())? else {
            return Ok(());
        };
        let Some(source) = prompt_value(
            Text::new("Source (optional):")
                .with_help_message("Leave empty if unknown")
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let source = Some(source).filter(|s| !s.trim().is_empty());

        let detection = with_spinner(
            "Checking with Gemini...",
            self.detection.detect(&title, &content, source),
        )
        .await?;
        println!("{}", render_detection(&detection));
        Ok(())
    }

    async fn check_file(&self) -> Result<(), DomainError> {
        let Some(path) = prompt_value(Text::new("Path to a .txt file:").prompt())? else {
            return Ok(());
        };
        let path = PathBuf::from(path.trim());
        let detection =
            with_spinner("Checking file with Gemini...", self.detection.detect_file(&path)).await?;
        println!("{}", render_detection(&detection));
        Ok(())
    }

    async fn deep_analysis(&self) -> Result<(), DomainError> {
        let Some(text) = prompt_value(Text::new("Text to analyze:").prompt())? else {
            return Ok(());
        };
        let analysis = with_spinner("Analyzing...", self.detection.analyze(&text)).await?;
        println!("\n{}\n", analysis.trim());
        Ok(())
    }

    async fn statistics(&self) -> Result<(), DomainError> {
        let Some(days) = self.prompt_days()? else {
            return Ok(());
        };
        let snapshot = self.reports.compute_statistics(days).await?;
        println!("{}", render_statistics(&snapshot, days));
        Ok(())
    }

    async fn recent(&self) -> Result<(), DomainError> {
        let Some(limit) = self.prompt_limit()? else {
            return Ok(());
        };
        let Some(fake_only) = prompt_value(
            Confirm::new("Only reports classified as fake?")
                .with_default(false)
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let records = self.reports.get_recent(limit, fake_only).await?;
        if records.is_empty() {
            println!("No reports yet.");
        }
        for record in &records {
            println!("{}", render_record_line(record));
        }
        Ok(())
    }

    async fn export_csv(&self) -> Result<(), DomainError> {
        let Some(limit) = self.prompt_limit()? else {
            return Ok(());
        };
        let path = self.reports.export_csv(limit, false).await?;
        println!("CSV written to {}", path.display());
        Ok(())
    }

    async fn digest(&self) -> Result<(), DomainError> {
        let Some(days) = self.prompt_days()? else {
            return Ok(());
        };
        let path = self.reports.write_digest(days).await?;
        println!("Digest written to {}", path.display());
        Ok(())
    }

    async fn import(&self) -> Result<(), DomainError> {
        let Some(path) = prompt_value(Text::new("Path to legacy reports.json:").prompt())? else {
            return Ok(());
        };
        let imported = self.reports.import_legacy(&PathBuf::from(path.trim())).await?;
        println!("Imported {} report(s).", imported);
        Ok(())
    }

    fn prompt_days(&self) -> Result<Option<u32>, DomainError> {
        prompt_value(
            CustomType::<u32>::new("Days in the recent window:")
                .with_default(self.default_days)
                .with_error_message("Enter a whole number of days")
                .prompt(),
        )
    }

    fn prompt_limit(&self) -> Result<Option<usize>, DomainError> {
        prompt_value(
            CustomType::<usize>::new("How many reports?")
                .with_default(self.default_limit)
                .with_error_message("Enter a positive whole number")
                .prompt(),
        )
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let options = vec![
            CHECK_ARTICLE,
            CHECK_FILE,
            DEEP_ANALYSIS,
            STATISTICS,
            RECENT,
            EXPORT_CSV,
            DIGEST,
            IMPORT,
            EXIT,
        ];
        loop {
            let Some(choice) = prompt_value(Select::new("Main menu", options.clone()).prompt())?
            else {
                return Ok(());
            };
            let outcome = match choice {
                CHECK_ARTICLE => self.check_article().await,
                CHECK_FILE => self.check_file().await,
                DEEP_ANALYSIS => self.deep_analysis().await,
                STATISTICS => self.statistics().await,
                RECENT => self.recent().await,
                EXPORT_CSV => self.export_csv().await,
                DIGEST => self.digest().await,
                IMPORT => self.import().await,
                _ => return Ok(()),
            };
            if let Err(e) = outcome {
                warn!(action = choice, error = %e, "menu action failed");
                println!("Error: {}", e);
            }
        }
    }
}

fn render_detection(d: &Detection) -> String {
    let verdict = if d.result.is_fake {
        "LIKELY FAKE"
    } else {
        "LIKELY REAL"
    };
    let mut out = format!(
        "\n{} ({:.0}% confidence) | report #{}\n",
        verdict,
        d.result.confidence * 100.0,
        d.report_id
    );
    if d.result.is_degraded() {
        out.push_str("(offline estimate: the AI service is rate limited)\n");
    }
    out.push_str(&format!("\n{}\n", d.result.explanation));
    out
}

fn render_record_line(r: &ReportRecord) -> String {
    format!(
        "#{:<5} {} {:<4} {:>4.0}%  {}  [{}]",
        r.id,
        r.timestamp.format("%Y-%m-%d %H:%M"),
        if r.is_fake { "FAKE" } else { "REAL" },
        r.confidence * 100.0,
        r.title,
        r.source.as_deref().unwrap_or("Unknown")
    )
}

fn render_statistics(s: &StatisticsSnapshot, days: u32) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nAll time: {} real / {} fake ({} total)\n",
        s.total_count.real, s.total_count.fake, s.total_count.total
    ));
    out.push_str(&format!(
        "Last {} day(s): {} real / {} fake ({} total)\n",
        days, s.recent_count.real, s.recent_count.fake, s.recent_count.total
    ));
    out.push_str(&format!(
        "Confidence: avg {:.2}, min {:.2}, max {:.2}\n",
        s.confidence_stats.average, s.confidence_stats.min, s.confidence_stats.max
    ));
    for ((range, band), count) in ConfidenceDistribution::LABELS
        .iter()
        .zip(ConfidenceDistribution::BANDS.iter())
        .zip(s.confidence_stats.distribution.counts())
    {
        out.push_str(&format!("  {} {:<24} {}\n", range, band, count));
    }
    if !s.by_source.is_empty() {
        out.push_str("By source:\n");
        for (source, count) in &s.by_source {
            out.push_str(&format!(
                "  {:<30} {} real / {} fake\n",
                source, count.real, count.fake
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassificationResult, Origin};

    #[test]
    fn test_render_detection_degraded_note() {
        let d = Detection {
            report_id: 4,
            title: "t".to_string(),
            source: None,
            result: ClassificationResult {
                is_fake: true,
                confidence: 0.65,
                explanation: "three phrases".to_string(),
                origin: Origin::Fallback,
            },
        };
        let out = render_detection(&d);
        assert!(out.contains("LIKELY FAKE (65% confidence) | report #4"));
        assert!(out.contains("offline estimate"));
    }

    #[test]
    fn test_prompt_value_cancel_is_none() {
        let res: Result<u32, InquireError> = Err(InquireError::OperationCanceled);
        assert!(prompt_value(res).unwrap().is_none());
    }
}
