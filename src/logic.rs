//! Core behaviors behind the HTTP handlers:
//!   - generating one structured problem (prompt, provider call, repair chain)
//!   - generating feedback text, falling back to a fixed string

use tracing::{error, info, instrument, warn};

use crate::domain::Problem;
use crate::error::GenerateError;
use crate::protocol::FeedbackIn;
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log, value_as_text};

#[instrument(level = "info", skip(state))]
pub async fn generate_problem(state: &AppState) -> Result<Problem, GenerateError> {
  let text = state.gateway.generate_text(&state.prompts.problem).await?;
  match state.repair.parse(&text) {
    Some(problem) => {
      info!(target: "problem", answer = problem.final_answer, text_len = problem.problem_text.len(), "Problem generated");
      Ok(problem)
    }
    None => {
      warn!(target: "problem", raw = %trunc_for_log(&text, 300), "Provider output could not be parsed");
      Err(GenerateError::Unparsable { raw: text })
    }
  }
}

pub fn feedback_prompt(state: &AppState, body: &FeedbackIn) -> String {
  fill_template(
    &state.prompts.feedback_template,
    &[
      ("user_answer", &value_as_text(&body.user_answer)),
      ("problem_text", &body.problem_text),
      ("final_answer", &value_as_text(&body.final_answer)),
    ],
  )
}

/// Never fails and never returns blank text.
#[instrument(level = "info", skip(state, body), fields(problem_len = body.problem_text.len()))]
pub async fn generate_feedback(state: &AppState, body: &FeedbackIn) -> String {
  let prompt = feedback_prompt(state, body);
  match state.gateway.generate_text(&prompt).await {
    Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
    Ok(_) => {
      warn!(target: "feedback", "Provider returned blank feedback; using fallback.");
      fallback(state)
    }
    Err(e) => {
      error!(target: "feedback", error = %e, "Feedback generation failed; using fallback.");
      fallback(state)
    }
  }
}

fn fallback(state: &AppState) -> String {
  let text = state.prompts.feedback_fallback.trim();
  if text.is_empty() { "Good effort!".into() } else { text.to_string() }
}
