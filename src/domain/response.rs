//! Turns raw model text into a [`ClassificationResult`].
//!
//! Extraction first (fenced block or raw text), then a strict decode. Anything that does
//! not decode becomes a best-effort [`Origin::HeuristicParse`] verdict.

use crate::domain::{ClassificationResult, Origin};
use serde::Deserialize;

const HEURISTIC_FAKE_CONFIDENCE: f64 = 0.7;
const HEURISTIC_REAL_CONFIDENCE: f64 = 0.3;

/// Shape the model is asked to return.
#[derive(Deserialize)]
struct StructuredVerdict {
    is_fake: bool,
    confidence: f64,
    explanation: String,
}

/// Pick the payload out of a model reply.
///
/// 1. a ```` ```json ```` fenced block → its inner content
/// 2. any fenced block → its inner content
/// 3. otherwise the whole text
pub fn extract_payload(raw: &str) -> &str {
    if let Some((_, after)) = raw.split_once("```json") {
        return after.split("```").next().unwrap_or(after).trim();
    }
    if raw.contains("```") {
        return raw.split("```").nth(1).unwrap_or(raw).trim();
    }
    raw.trim()
}

/// Parse a classification reply. Never fails.
pub fn parse_classification(raw: &str) -> ClassificationResult {
    match serde_json::from_str::<StructuredVerdict>(extract_payload(raw)) {
        Ok(v) => ClassificationResult {
            is_fake: v.is_fake,
            confidence: v.confidence,
            explanation: v.explanation,
            origin: Origin::Structured,
        },
        Err(_) => heuristic_parse(raw),
    }
}

/// Fake when the text mentions the `is_fake` field together with `true`.
fn heuristic_parse(raw: &str) -> ClassificationResult {
    let lowered = raw.to_lowercase();
    let is_fake = lowered.contains("is_fake") && lowered.contains("true");
    ClassificationResult {
        is_fake,
        confidence: if is_fake {
            HEURISTIC_FAKE_CONFIDENCE
        } else {
            HEURISTIC_REAL_CONFIDENCE
        },
        explanation: raw.to_string(),
        origin: Origin::HeuristicParse,
    }
}
