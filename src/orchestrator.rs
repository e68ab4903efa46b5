//! Drives the view through one full round: fetch a problem, save the session,
//! take an answer, fetch feedback, save the submission.
//!
//! Persistence is observed, not awaited for success: a failed write is logged and
//! the student still sees the problem or the feedback.

use tracing::{error, info, instrument, warn};

use crate::client::ProblemApi;
use crate::domain::{number_value, Submission};
use crate::protocol::FeedbackIn;
use crate::store::SessionStore;
use crate::view::{Event, Phase, Rejected, View};

pub struct Orchestrator<A, S> {
  api: A,
  store: S,
}

impl<A: ProblemApi, S: SessionStore> Orchestrator<A, S> {
  pub fn new(api: A, store: S) -> Self { Self { api, store } }

  #[instrument(level = "info", skip_all)]
  pub async fn generate(&self, view: &View) -> Result<View, Rejected> {
    let loading = view.apply(Event::GenerateRequested)?;
    let event = match self.api.fetch_problem().await {
      Ok(problem) => {
        let session_id = match self.store.create_session(&problem).await {
          Ok(id) => {
            info!(target: "store", session_id = %id, "Session saved");
            Some(id)
          }
          Err(e) => {
            error!(target: "store", error = %e, "Saving the session failed");
            None
          }
        };
        Event::ProblemReady { problem, session_id }
      }
      Err(e) => {
        error!(target: "problem", error = %e, "Fetching a problem failed");
        Event::ProblemFailed
      }
    };
    loading.apply(event)
  }

  #[instrument(level = "info", skip(self, view), fields(answer_len = raw.len()))]
  pub async fn submit(&self, view: &View, raw: &str) -> Result<View, Rejected> {
    let loading = view.apply(Event::AnswerSubmitted { raw: raw.to_string() })?;
    let Phase::SubmissionLoading { problem, session_id, user_answer, is_correct } = loading.phase() else {
      return Err(Rejected::OutOfOrder("answer_submitted"));
    };

    let req = FeedbackIn {
      problem_text: problem.problem_text.clone(),
      user_answer: number_value(*user_answer),
      final_answer: number_value(problem.final_answer),
    };
    let feedback = match self.api.fetch_feedback(&req).await {
      Ok(f) => f,
      Err(e) => {
        error!(target: "feedback", error = %e, "Fetching feedback failed");
        return loading.apply(Event::SubmissionFailed);
      }
    };

    let submission = Submission {
      session_id: session_id.clone(),
      user_answer: *user_answer,
      is_correct: *is_correct,
      feedback_text: feedback.clone(),
    };
    if let Err(e) = self.store.record_submission(&submission).await {
      warn!(target: "store", session_id = %submission.session_id, error = %e, "Saving the submission failed");
    }

    loading.apply(Event::SubmissionResolved { feedback })
  }
}
