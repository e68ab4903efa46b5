//! Minimal Gemini client for our use-cases.
//!
//! We only call `generateContent` with a single text part and read back the first
//! candidate's first part. Calls are instrumented and log model name, latency and
//! token usage (not contents, except a truncated body at debug level).
//!
//! NOTE: the API key travels in the query string; never log the URL.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::GeminiConfig;
use crate::error::GatewayError;
use crate::util::trunc_for_log;

/// Anything that turns a prompt into provider text. The HTTP handlers only see this.
#[async_trait]
pub trait LlmGateway: Send + Sync {
  async fn generate_text(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  config: GeminiConfig,
}

impl Gemini {
  /// No request timeout is set: a slow provider stalls the caller.
  pub fn new(config: GeminiConfig) -> Self {
    Self { client: reqwest::Client::new(), config }
  }

  pub fn model(&self) -> &str { &self.config.model }
  pub fn base_url(&self) -> &str { &self.config.base_url }
  pub fn enabled(&self) -> bool { self.config.api_key.is_some() }
}

#[async_trait]
impl LlmGateway for Gemini {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
  async fn generate_text(&self, prompt: &str) -> Result<String, GatewayError> {
    let api_key = self.config.api_key.as_deref().ok_or(GatewayError::NotConfigured)?;
    let url = format!("{}/models/{}:generateContent", self.config.base_url, self.config.model);
    let req = GenerateRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.to_string() }] }],
    };

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .query(&[("key", api_key)])
      .header(USER_AGENT, "math-coach/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or(body);
      error!(?status, elapsed = ?start.elapsed(), "Gemini returned an error status");
      return Err(GatewayError::Status { status, message });
    }

    let body = res.text().await?;
    debug!(body = %trunc_for_log(&body, 600), "Gemini raw response");
    let parsed = decode_response(&body).map_err(|e| {
      error!(error = %e, body = %trunc_for_log(&body, 300), "Gemini body could not be decoded");
      e
    })?;
    if let Some(usage) = &parsed.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidates_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        elapsed = ?start.elapsed(),
        "Gemini usage"
      );
    }

    first_candidate_text(parsed).ok_or(GatewayError::EmptyResponse)
  }
}

fn decode_response(body: &str) -> Result<GenerateResponse, GatewayError> {
  serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
  resp.candidates.into_iter().next()
    .and_then(|c| c.content)
    .and_then(|c| c.parts.into_iter().next())
    .and_then(|p| p.text)
    .filter(|t| !t.trim().is_empty())
}

// --- generateContent DTOs ---

#[derive(Serialize)]
struct GenerateRequest { contents: Vec<Content> }
#[derive(Serialize)]
struct Content { parts: Vec<Part> }
#[derive(Serialize)]
struct Part { text: String }

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)] candidates: Vec<Candidate>,
  #[serde(default)] usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate { #[serde(default)] content: Option<CandidateContent> }
#[derive(Deserialize)]
struct CandidateContent { #[serde(default)] parts: Vec<CandidatePart> }
#[derive(Deserialize)]
struct CandidatePart { #[serde(default)] text: Option<String> }
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(body: &str) -> GenerateResponse {
    serde_json::from_str(body).unwrap()
  }

  #[test]
  fn reads_first_candidate_first_part() {
    let resp = parse(r#"{
      "candidates": [
        {"content": {"parts": [{"text": "first"}, {"text": "second"}]}},
        {"content": {"parts": [{"text": "other"}]}}
      ],
      "usageMetadata": {"promptTokenCount": 10, "totalTokenCount": 30}
    }"#);
    assert_eq!(resp.usage_metadata.as_ref().and_then(|u| u.total_token_count), Some(30));
    assert_eq!(first_candidate_text(resp).as_deref(), Some("first"));
  }

  #[test]
  fn missing_or_blank_candidates_are_empty() {
    assert_eq!(first_candidate_text(parse(r#"{}"#)), None);
    assert_eq!(first_candidate_text(parse(r#"{"candidates": []}"#)), None);
    assert_eq!(first_candidate_text(parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)), None);
    assert_eq!(first_candidate_text(parse(r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#)), None);
  }

  #[test]
  fn non_json_success_body_is_malformed_not_empty() {
    assert!(matches!(decode_response("<html>oops</html>"), Err(GatewayError::MalformedResponse(_))));
    assert!(matches!(decode_response(r#"{"candidates": "nope"}"#), Err(GatewayError::MalformedResponse(_))));
    assert!(decode_response("{}").is_ok());
  }

  #[test]
  fn request_body_matches_provider_shape() {
    let req = GenerateRequest { contents: vec![Content { parts: vec![Part { text: "hi".into() }] }] };
    assert_eq!(serde_json::to_value(&req).unwrap(), serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]}));
  }

  #[test]
  fn extracts_provider_error_message() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("API key not valid"));
    assert_eq!(extract_gemini_error("<html>"), None);
  }

  #[tokio::test]
  async fn missing_key_fails_the_call_not_the_process() {
    let gemini = Gemini::new(GeminiConfig::default());
    assert!(!gemini.enabled());
    let err = gemini.generate_text("anything").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotConfigured));
  }
}
