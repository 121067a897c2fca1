//! Offline heuristic classifier. Used when every credential is rate limited.
//!
//! Deterministic: counts distinct suspicious phrases in title + content.

use crate::domain::{ClassificationRequest, ClassificationResult, Origin};

/// Phrases often found in misleading content. Matched case-insensitively as substrings.
pub const SUSPICIOUS_PHRASES: &[&str] = &[
    "shocking",
    "conspiracy",
    "secret",
    "they don't want you to know",
    "mainstream media won't tell you",
    "miracle",
    "shocking truth",
    "government cover-up",
    "what they're hiding",
    "doctors hate this",
    "one weird trick",
    "you won't believe",
    "unbelievable",
    "sensational",
];

/// Matches at or above this count flip the verdict to fake.
const FAKE_THRESHOLD: usize = 3;
const STEP: f64 = 0.05;
const CONFIDENCE_CAP: f64 = 0.95;
const CONFIDENCE_FLOOR: f64 = 0.05;

const DISCLAIMER: &str = "Due to API rate limits, we're using a simplified analysis method.";

/// Number of distinct [`SUSPICIOUS_PHRASES`] present in `text`.
pub fn suspicious_phrase_count(text: &str) -> usize {
    let lowered = text.to_lowercase();
    SUSPICIOUS_PHRASES
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .count()
}

/// Classify without any remote call. Always tagged [`Origin::Fallback`].
pub fn fallback_classify(request: &ClassificationRequest) -> ClassificationResult {
    let combined = format!("{} {}", request.title, request.content);
    let count = suspicious_phrase_count(&combined);

    if count >= FAKE_THRESHOLD {
        ClassificationResult {
            is_fake: true,
            confidence: (0.5 + STEP * count as f64).min(CONFIDENCE_CAP),
            explanation: format!(
                "{} This content contains {} phrases often associated with misleading content. \
                 This is not a definitive classification and you should verify with other sources.",
                DISCLAIMER, count
            ),
            origin: Origin::Fallback,
        }
    } else {
        ClassificationResult {
            is_fake: false,
            confidence: (0.5 - STEP * count as f64).max(CONFIDENCE_FLOOR),
            explanation: format!(
                "{} This content contains {} phrases that might indicate misleading content. \
                 The content appears relatively neutral, but this is not a definitive \
                 classification and you should verify with other sources.",
                DISCLAIMER, count
            ),
            origin: Origin::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_phrases_is_real_at_half() {
        let r = fallback_classify(&ClassificationRequest::new(
            "City council meets",
            "The budget was approved on Tuesday.",
        ));
        assert!(!r.is_fake);
        assert!(approx(r.confidence, 0.50));
        assert_eq!(r.origin, Origin::Fallback);
        assert!(r.explanation.contains("0 phrases"));
    }

    #[test]
    fn test_one_phrase_is_real_at_045() {
        let r = fallback_classify(&ClassificationRequest::new(
            "A secret recipe",
            "Grandma shares her soup.",
        ));
        assert!(!r.is_fake);
        assert!(approx(r.confidence, 0.45));
    }

    #[test]
    fn test_three_phrases_is_fake_at_065() {
        let r = fallback_classify(&ClassificationRequest::new(
            "MIRACLE cure",
            "A conspiracy so secret it hurts.",
        ));
        assert!(r.is_fake);
        assert!(approx(r.confidence, 0.65));
        assert!(r.explanation.contains("3 phrases"));
    }

    #[test]
    fn test_many_phrases_capped() {
        // shocking, shocking truth, conspiracy, secret, miracle, doctors hate this,
        // one weird trick, you won't believe, unbelievable
        let r = fallback_classify(&ClassificationRequest::new(
            "The shocking truth",
            "A conspiracy, a secret miracle: doctors hate this one weird trick. \
             You won't believe it, unbelievable!",
        ));
        assert_eq!(
            suspicious_phrase_count(
                "The shocking truth A conspiracy, a secret miracle: doctors hate this one weird trick. \
                 You won't believe it, unbelievable!"
            ),
            9
        );
        assert!(r.is_fake);
        assert!(approx(r.confidence, 0.95));
    }

    #[test]
    fn test_repeated_phrase_counts_once() {
        assert_eq!(suspicious_phrase_count("secret secret SECRET"), 1);
    }

    #[test]
    fn test_deterministic() {
        let req = ClassificationRequest::new("Sensational", "unbelievable miracle");
        assert_eq!(fallback_classify(&req), fallback_classify(&req));
    }
}
