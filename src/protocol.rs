//! Public protocol structs for the HTTP endpoints (serde ready).
//! Shared by the server handlers and the terminal client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/feedback`. The answers are interpolated into the prompt
/// as-is, so they stay loosely typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackIn {
  pub problem_text: String,
  pub user_answer: Value,
  pub final_answer: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackOut {
  pub feedback: String,
}

/// Stable machine-readable tag of a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Transport,
  EmptyResponse,
  Unparsable,
}

/// Error body of `POST /api/generate-problem`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
  pub error: String,
  pub kind: ErrorKind,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub raw: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
