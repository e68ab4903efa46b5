//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{error, info, instrument};

use crate::error::{GatewayError, GenerateError};
use crate::logic::{generate_feedback, generate_problem};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_generate_problem(State(state): State<Arc<AppState>>) -> Response {
  match generate_problem(&state).await {
    Ok(problem) => Json(problem).into_response(),
    Err(e) => {
      error!(target: "problem", error = %e, "Problem generation failed");
      e.into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(problem_len = body.problem_text.len()))]
pub async fn http_post_feedback(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FeedbackIn>,
) -> impl IntoResponse {
  let feedback = generate_feedback(&state, &body).await;
  info!(target: "feedback", feedback_len = feedback.len(), "Feedback served");
  Json(FeedbackOut { feedback })
}

impl IntoResponse for GenerateError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      GenerateError::Gateway(GatewayError::EmptyResponse) => (
        StatusCode::BAD_GATEWAY,
        ErrorOut { error: "Empty response from provider".into(), kind: ErrorKind::EmptyResponse, raw: None },
      ),
      GenerateError::Gateway(_) => (
        StatusCode::BAD_GATEWAY,
        ErrorOut { error: "Provider request failed".into(), kind: ErrorKind::Transport, raw: None },
      ),
      GenerateError::Unparsable { raw } => (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorOut { error: "Could not parse provider output".into(), kind: ErrorKind::Unparsable, raw: Some(raw) },
      ),
    };
    (status, Json(body)).into_response()
  }
}
