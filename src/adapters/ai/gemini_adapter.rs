//! Gemini adapter for remote classification.
//!
//! Implements `ClassifierGateway` over the `generateContent` REST endpoint.
//! HTTP 429 and `RESOURCE_EXHAUSTED` map to `GatewayError::RateLimited`.

use crate::domain::ApiKey;
use crate::ports::{ClassifierGateway, GatewayError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Gemini REST adapter.
///
/// The credential is supplied per call so the client can rotate keys without rebuilding
/// the adapter.
pub struct GeminiAdapter {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    /// * `api_url` - API base (e.g., "https://generativelanguage.googleapis.com/v1beta")
    /// * `model` - Model name (e.g., "gemini-2.0-flash")
    /// * `timeout` - Per-request timeout enforced by the HTTP client
    pub fn new(api_url: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "HTTP client builder failed; using defaults");
                reqwest::Client::new()
            });
        Self {
            client,
            api_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(prompt: &str) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_p: 0.95,
                top_k: 64,
                max_output_tokens: 2048,
                candidate_count: 1,
            },
            safety_settings: [
                "HARM_CATEGORY_HARASSMENT",
                "HARM_CATEGORY_HATE_SPEECH",
                "HARM_CATEGORY_SEXUALLY_EXPLICIT",
                "HARM_CATEGORY_DANGEROUS_CONTENT",
            ]
            .into_iter()
            .map(|category| SafetySetting {
                category,
                threshold: "BLOCK_MEDIUM_AND_ABOVE",
            })
            .collect(),
        }
    }

    /// Map a non-success HTTP reply to a typed error.
    fn classify_status(status: StatusCode, body: &str) -> GatewayError {
        let snippet: String = body.chars().take(200).collect();
        let message = format!("API error {}: {}", status, snippet);
        if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
            GatewayError::RateLimited(message)
        } else {
            GatewayError::Other(message)
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn reply_text(response: GenerateResponse) -> Result<String, GatewayError> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            GatewayError::Other(format!("empty response: {}", reason))
        })?;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GatewayError::Other(format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

/// Gemini request structure.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    candidate_count: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Gemini response structure.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[async_trait::async_trait]
impl ClassifierGateway for GeminiAdapter {
    async fn call(&self, credential: &ApiKey, prompt: &str) -> Result<String, GatewayError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "sending prompt to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose())
            .json(&Self::request_body(prompt))
            .send()
            .await
            // Transport errors carry no status; fall back to message matching.
            .map_err(|e| GatewayError::from_message(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini API returned error");
            return Err(Self::classify_status(status, &text));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Other(format!("Failed to parse API response: {}", e)))?;

        let text = Self::reply_text(body)?;
        debug!(reply_len = text.len(), "received Gemini reply");
        Ok(text)
    }
}
