//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ApiKey, DomainError, NewReport, ReportQuery, ReportRecord};
use thiserror::Error;

/// Failure of a single remote classifier call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Quota exhausted or throttled. Absorbed by the client's retry/fallback loop.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Anything else. Surfaced to the caller without retry.
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Degraded path for gateways that only surface free-form error text.
    ///
    /// Matches `429`, `quota` or `rate limit` case-insensitively. Fragile by nature:
    /// gateways that know the failure kind should build the variant directly.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if lowered.contains("429") || lowered.contains("quota") || lowered.contains("rate limit")
        {
            GatewayError::RateLimited(message)
        } else {
            GatewayError::Other(message)
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited(_))
    }
}

/// Remote generative classifier. One call = one prompt with one credential.
#[async_trait::async_trait]
pub trait ClassifierGateway: Send + Sync {
    /// Send `prompt` authenticated with `credential`; return the model's raw text.
    async fn call(&self, credential: &ApiKey, prompt: &str) -> Result<String, GatewayError>;
}

/// Append-only report persistence.
#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert one report. Returns the id assigned by the store.
    async fn insert(&self, report: &NewReport) -> Result<i64, DomainError>;

    /// Insert many reports. Default: one insert at a time.
    async fn insert_batch(&self, reports: &[NewReport]) -> Result<Vec<i64>, DomainError> {
        let mut ids = Vec::with_capacity(reports.len());
        for report in reports {
            ids.push(self.insert(report).await?);
        }
        Ok(ids)
    }

    /// Reports matching `query`, newest first.
    async fn query(&self, query: &ReportQuery) -> Result<Vec<ReportRecord>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_rate_limit_tokens() {
        assert!(GatewayError::from_message("HTTP 429 Too Many Requests").is_rate_limited());
        assert!(GatewayError::from_message("Quota exceeded for metric").is_rate_limited());
        assert!(GatewayError::from_message("Rate Limit reached").is_rate_limited());
    }

    #[test]
    fn test_from_message_other() {
        let err = GatewayError::from_message("API key not valid");
        assert_eq!(err, GatewayError::Other("API key not valid".to_string()));
    }
}
