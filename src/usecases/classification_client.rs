//! Resilient classification client.
//!
//! Rotates through the key pool on rate limits, backs off between attempts and degrades to
//! the offline heuristic (or a fixed checklist for `analyze`) once every attempt is spent.
//! Non-rate-limit gateway errors are returned immediately.

use crate::domain::fallback::fallback_classify;
use crate::domain::response::parse_classification;
use crate::domain::{ClassificationRequest, ClassificationResult, DomainError, KeyPool};
use crate::ports::{ClassifierGateway, GatewayError};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Returned by `analyze` when no credential could serve the request.
pub const ANALYSIS_FALLBACK: &str = "Unable to perform detailed analysis due to API rate limits. \
Please try again later or verify this content with other fact-checking sources. \
When analyzing news, look for these indicators of potential fake news:\n\n\
1. Sensationalist language and clickbait headlines\n\
2. Lack of cited sources or references to anonymous sources\n\
3. Emotional manipulation and fear-mongering\n\
4. Missing context or incomplete information\n\
5. Non-reputable or unfamiliar publication source\n\
6. Poor grammar, spelling errors, or excessive use of ALL CAPS\n\
7. Claims that seem too shocking or unlikely to be true\n\
8. Recently created website with no history\n\n\
Always cross-check information across multiple reliable sources.";

/// Backoff and attempt limits.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Upper bound on attempts per request; the pool size bounds it too.
    pub max_key_attempts: usize,
    /// Sleep between a rate-limited attempt and the next key.
    pub retry_delay: Duration,
    /// Random sleep in `[min, max]` before returning a degraded result.
    pub fallback_jitter_min: Duration,
    pub fallback_jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_key_attempts: 3,
            retry_delay: Duration::from_secs(1),
            fallback_jitter_min: Duration::from_secs(1),
            fallback_jitter_max: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// No sleeping at all. For tests and offline tooling.
    pub fn immediate() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            fallback_jitter_min: Duration::ZERO,
            fallback_jitter_max: Duration::ZERO,
            ..Self::default()
        }
    }

    fn fallback_jitter(&self) -> Duration {
        let lo = self.fallback_jitter_min.as_millis() as u64;
        let hi = (self.fallback_jitter_max.as_millis() as u64).max(lo);
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

/// What the rotation loop produced.
enum RemoteOutcome {
    Reply(String),
    /// Every attempt was rate limited.
    Exhausted,
}

/// Classification client. Cheap to share via `Arc`.
pub struct ClassificationClient {
    gateway: Arc<dyn ClassifierGateway>,
    keys: Arc<KeyPool>,
    policy: RetryPolicy,
    /// Bounds in-flight remote calls; callers wait for a permit (backpressure).
    permits: Arc<Semaphore>,
}

impl ClassificationClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `gateway` - Remote classifier implementation
    /// * `keys` - Shared credential pool
    /// * `policy` - Attempt cap and backoff timings
    /// * `max_concurrent_calls` - Remote calls allowed in flight at once (min 1)
    pub fn new(
        gateway: Arc<dyn ClassifierGateway>,
        keys: Arc<KeyPool>,
        policy: RetryPolicy,
        max_concurrent_calls: usize,
    ) -> Self {
        Self {
            gateway,
            keys,
            policy,
            permits: Arc::new(Semaphore::new(max_concurrent_calls.max(1))),
        }
    }

    /// Attempts made per request: `min(pool size, max_key_attempts)`.
    pub fn attempts(&self) -> usize {
        self.keys.len().min(self.policy.max_key_attempts).max(1)
    }

    /// Classify an article. Rate limits never surface as errors.
    ///
    /// # Errors
    /// `DomainError::Classification` for non-rate-limit gateway failures.
    pub async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<ClassificationResult, DomainError> {
        let prompt = classification_prompt(request);
        match self.call_with_rotation("classify", &prompt).await? {
            RemoteOutcome::Reply(raw) => {
                let result = parse_classification(&raw);
                info!(
                    is_fake = result.is_fake,
                    confidence = result.confidence,
                    origin = %result.origin,
                    "classification complete"
                );
                Ok(result)
            }
            RemoteOutcome::Exhausted => {
                warn!("all API keys rate limited; using fallback classification");
                Ok(fallback_classify(request))
            }
        }
    }

    /// Free-form analysis. Degrades to a fixed checklist when every key is rate limited.
    ///
    /// # Errors
    /// `DomainError::Classification` for non-rate-limit gateway failures.
    pub async fn analyze(&self, text: &str) -> Result<String, DomainError> {
        let prompt = analysis_prompt(text);
        match self.call_with_rotation("analyze", &prompt).await? {
            RemoteOutcome::Reply(raw) => Ok(raw),
            RemoteOutcome::Exhausted => {
                warn!("all API keys rate limited; returning fallback analysis");
                Ok(ANALYSIS_FALLBACK.to_string())
            }
        }
    }

    async fn call_with_rotation(
        &self,
        operation: &'static str,
        prompt: &str,
    ) -> Result<RemoteOutcome, DomainError> {
        let attempts = self.attempts();
        let pool_size = self.keys.len();

        for attempt in 0..attempts {
            let key = if attempt > 0 {
                let key = self.keys.rotate();
                info!(
                    operation,
                    key = self.keys.cursor() + 1,
                    pool_size,
                    "trying alternate API key"
                );
                key
            } else {
                self.keys.current()
            };

            let reply = {
                let _permit = self
                    .permits
                    .acquire()
                    .await
                    .map_err(|e| DomainError::Classification(format!("worker pool closed: {}", e)))?;
                debug!(operation, attempt, "calling remote classifier");
                self.gateway.call(&key, prompt).await
            };

            match reply {
                Ok(text) => return Ok(RemoteOutcome::Reply(text)),
                Err(GatewayError::RateLimited(msg)) => {
                    warn!(
                        operation,
                        key = self.keys.cursor() + 1,
                        pool_size,
                        error = %msg,
                        "rate limit exceeded"
                    );
                    if attempt + 1 == attempts {
                        tokio::time::sleep(self.policy.fallback_jitter()).await;
                        return Ok(RemoteOutcome::Exhausted);
                    }
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(GatewayError::Other(msg)) => {
                    warn!(operation, error = %msg, "remote classifier failed");
                    return Err(DomainError::Classification(msg));
                }
            }
        }

        Ok(RemoteOutcome::Exhausted)
    }
}

/// Prompt asking for a JSON verdict with banded confidence.
pub fn classification_prompt(request: &ClassificationRequest) -> String {
    format!(
        r#"Analyze the following news article for factual accuracy and determine if it's fake news.

Title: {title}

Content: {content}

Please provide a JSON response with the following structure:
{{
    "is_fake": true/false,
    "confidence": float (0.0 to 1.0),
    "explanation": "detailed explanation of why this is considered fake or real news"
}}

For the confidence score:
- 0.0-0.2: Highly confident it's real news
- 0.2-0.4: Somewhat confident it's real news
- 0.4-0.6: Uncertain
- 0.6-0.8: Somewhat confident it's fake news
- 0.8-1.0: Highly confident it's fake news

Focus on analyzing language patterns, source credibility, consistency with known facts, logical coherence, and emotional manipulation tactics.
"#,
        title = request.title,
        content = request.content
    )
}

/// Prompt for the free-form deep analysis.
pub fn analysis_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following news content in detail:

{text}

Provide a comprehensive analysis covering:
1. Factual accuracy - identify any false or misleading claims
2. Source credibility assessment
3. Language analysis - identify emotional manipulation, propaganda techniques
4. Context analysis - is important context missing?
5. Overall assessment of reliability

Please be specific and cite examples from the text.
"#
    )
}
