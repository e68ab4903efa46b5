//! Client-side view state.
//!
//! The whole screen is one immutable `View` value. Every user action or network
//! outcome is an `Event`; `View::apply` returns the next view or says why the
//! event is not allowed right now.
//!
//! ```text
//! Idle -> ProblemLoading -> AwaitingAnswer -> SubmissionLoading -> Resolved
//!           |  (failure)         ^                 | (failure)
//!           v                    +-----------------+
//!          Idle
//! ```
//! Generation may be requested again from any phase that is not loading.

use thiserror::Error;

use crate::domain::{is_correct, parse_answer, Problem, SessionId};

#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
  Idle,
  ProblemLoading,
  /// `session_id` is `None` when persisting the problem failed; answering is then blocked.
  AwaitingAnswer { problem: Problem, session_id: Option<SessionId> },
  SubmissionLoading { problem: Problem, session_id: SessionId, user_answer: f64, is_correct: bool },
  Resolved { problem: Problem, session_id: SessionId, user_answer: f64, is_correct: bool, feedback: String },
}

/// Generic warnings. Internal error details never reach the student.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
  GenerationFailed,
  SubmissionFailed,
}

impl Notice {
  pub fn message(self) -> &'static str {
    match self {
      Notice::GenerationFailed => "Something went wrong while generating the problem. Please try again.",
      Notice::SubmissionFailed => "Something went wrong while submitting the answer. Please try again.",
    }
  }
}

#[derive(Clone, Debug)]
pub enum Event {
  GenerateRequested,
  ProblemReady { problem: Problem, session_id: Option<SessionId> },
  ProblemFailed,
  AnswerSubmitted { raw: String },
  SubmissionResolved { feedback: String },
  SubmissionFailed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejected {
  #[error("a request is already in flight")]
  Busy,
  #[error("there is no problem to answer")]
  NoProblem,
  #[error("the problem was not saved; generate a new one")]
  NoSession,
  #[error("this problem has already been answered")]
  AlreadyAnswered,
  #[error("please type a number")]
  InvalidAnswer,
  #[error("event {0} is not valid in the current phase")]
  OutOfOrder(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
  phase: Phase,
  notice: Option<Notice>,
}

impl Default for View {
  fn default() -> Self { Self { phase: Phase::Idle, notice: None } }
}

impl View {
  pub fn phase(&self) -> &Phase { &self.phase }
  pub fn notice(&self) -> Option<Notice> { self.notice }

  pub fn is_loading(&self) -> bool {
    matches!(self.phase, Phase::ProblemLoading | Phase::SubmissionLoading { .. })
  }

  pub fn problem(&self) -> Option<&Problem> {
    match &self.phase {
      Phase::AwaitingAnswer { problem, .. }
      | Phase::SubmissionLoading { problem, .. }
      | Phase::Resolved { problem, .. } => Some(problem),
      Phase::Idle | Phase::ProblemLoading => None,
    }
  }

  fn with(phase: Phase, notice: Option<Notice>) -> Self { Self { phase, notice } }

  pub fn apply(&self, event: Event) -> Result<View, Rejected> {
    use Phase::*;
    match (event, &self.phase) {
      (Event::GenerateRequested, ProblemLoading | SubmissionLoading { .. }) => Err(Rejected::Busy),
      (Event::GenerateRequested, _) => Ok(View::with(ProblemLoading, None)),

      (Event::ProblemReady { problem, session_id }, ProblemLoading) => {
        Ok(View::with(AwaitingAnswer { problem, session_id }, None))
      }
      (Event::ProblemFailed, ProblemLoading) => Ok(View::with(Idle, Some(Notice::GenerationFailed))),
      (Event::ProblemReady { .. }, _) => Err(Rejected::OutOfOrder("problem_ready")),
      (Event::ProblemFailed, _) => Err(Rejected::OutOfOrder("problem_failed")),

      (Event::AnswerSubmitted { raw }, AwaitingAnswer { problem, session_id }) => {
        let session_id = session_id.clone().ok_or(Rejected::NoSession)?;
        let user_answer = parse_answer(&raw).ok_or(Rejected::InvalidAnswer)?;
        Ok(View::with(
          SubmissionLoading {
            problem: problem.clone(),
            session_id,
            user_answer,
            is_correct: is_correct(user_answer, problem.final_answer),
          },
          None,
        ))
      }
      (Event::AnswerSubmitted { .. }, Idle) => Err(Rejected::NoProblem),
      (Event::AnswerSubmitted { .. }, Resolved { .. }) => Err(Rejected::AlreadyAnswered),
      (Event::AnswerSubmitted { .. }, _) => Err(Rejected::Busy),

      (Event::SubmissionResolved { feedback }, SubmissionLoading { problem, session_id, user_answer, is_correct }) => {
        Ok(View::with(
          Resolved {
            problem: problem.clone(),
            session_id: session_id.clone(),
            user_answer: *user_answer,
            is_correct: *is_correct,
            feedback,
          },
          None,
        ))
      }
      (Event::SubmissionFailed, SubmissionLoading { problem, session_id, .. }) => Ok(View::with(
        AwaitingAnswer { problem: problem.clone(), session_id: Some(session_id.clone()) },
        Some(Notice::SubmissionFailed),
      )),
      (Event::SubmissionResolved { .. }, _) => Err(Rejected::OutOfOrder("submission_resolved")),
      (Event::SubmissionFailed, _) => Err(Rejected::OutOfOrder("submission_failed")),
    }
  }

  /// Plain-text rendering of the current screen.
  pub fn render(&self) -> String {
    let mut out = String::new();
    if let Some(n) = self.notice {
      out.push_str(&format!("⚠️ {}\n", n.message()));
    }
    match &self.phase {
      Phase::Idle => out.push_str("Press enter to generate a new problem.\n"),
      Phase::ProblemLoading => out.push_str("Generating...\n"),
      Phase::AwaitingAnswer { problem, session_id } => {
        out.push_str(&format!("Problem:\n{}\n", problem.problem_text));
        if session_id.is_none() {
          out.push_str("(This problem could not be saved. Generate a new one to answer.)\n");
        }
      }
      Phase::SubmissionLoading { problem, .. } => {
        out.push_str(&format!("Problem:\n{}\nChecking your answer...\n", problem.problem_text));
      }
      Phase::Resolved { problem, user_answer, is_correct, feedback, .. } => {
        let headline = if *is_correct { "🎉 Great job!" } else { "🤔 Let's try again!" };
        out.push_str(&format!(
          "Problem:\n{}\nYour answer: {}\n{}\n{}\n",
          problem.problem_text, user_answer, headline, feedback
        ));
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn apples() -> Problem {
    Problem { problem_text: "Tom has 5 apples and buys 3 more. How many now?".into(), final_answer: 8.0 }
  }

  fn awaiting(session: Option<&str>) -> View {
    View::default()
      .apply(Event::GenerateRequested).unwrap()
      .apply(Event::ProblemReady { problem: apples(), session_id: session.map(SessionId::new) }).unwrap()
  }

  #[test]
  fn happy_path_reaches_resolved() {
    let v = awaiting(Some("s1"));
    let v = v.apply(Event::AnswerSubmitted { raw: "8".into() }).unwrap();
    assert!(v.is_loading());
    let v = v.apply(Event::SubmissionResolved { feedback: "Well done!".into() }).unwrap();
    match v.phase() {
      Phase::Resolved { is_correct, session_id, feedback, .. } => {
        assert!(*is_correct);
        assert_eq!(session_id, &SessionId::new("s1"));
        assert_eq!(feedback, "Well done!");
      }
      other => panic!("unexpected phase {other:?}"),
    }
    assert!(v.render().contains("Great job!"));
  }

  #[test]
  fn correctness_not_feedback_drives_the_headline() {
    let v = awaiting(Some("s1"))
      .apply(Event::AnswerSubmitted { raw: "7".into() }).unwrap()
      .apply(Event::SubmissionResolved { feedback: "Great job, superstar!".into() }).unwrap();
    assert!(v.render().contains("Let's try again!"));
  }

  #[test]
  fn submission_needs_problem_and_session() {
    assert_eq!(View::default().apply(Event::AnswerSubmitted { raw: "8".into() }), Err(Rejected::NoProblem));
    assert_eq!(awaiting(None).apply(Event::AnswerSubmitted { raw: "8".into() }), Err(Rejected::NoSession));
  }

  #[test]
  fn blank_or_non_numeric_answers_are_rejected() {
    let v = awaiting(Some("s1"));
    assert_eq!(v.apply(Event::AnswerSubmitted { raw: "".into() }), Err(Rejected::InvalidAnswer));
    assert_eq!(v.apply(Event::AnswerSubmitted { raw: "eight".into() }), Err(Rejected::InvalidAnswer));
  }

  #[test]
  fn loading_phases_refuse_duplicate_actions() {
    let loading = View::default().apply(Event::GenerateRequested).unwrap();
    assert_eq!(loading.apply(Event::GenerateRequested), Err(Rejected::Busy));
    let submitting = awaiting(Some("s1")).apply(Event::AnswerSubmitted { raw: "8".into() }).unwrap();
    assert_eq!(submitting.apply(Event::AnswerSubmitted { raw: "8".into() }), Err(Rejected::Busy));
    assert_eq!(submitting.apply(Event::GenerateRequested), Err(Rejected::Busy));
  }

  #[test]
  fn failures_leave_a_stable_phase_with_a_generic_notice() {
    let v = View::default().apply(Event::GenerateRequested).unwrap().apply(Event::ProblemFailed).unwrap();
    assert_eq!(v.phase(), &Phase::Idle);
    assert_eq!(v.notice(), Some(Notice::GenerationFailed));
    assert!(v.apply(Event::GenerateRequested).is_ok());

    let v = awaiting(Some("s1"))
      .apply(Event::AnswerSubmitted { raw: "8".into() }).unwrap()
      .apply(Event::SubmissionFailed).unwrap();
    assert!(matches!(v.phase(), Phase::AwaitingAnswer { session_id: Some(_), .. }));
    assert_eq!(v.notice(), Some(Notice::SubmissionFailed));
    assert!(v.render().contains("submitting the answer"));
  }

  #[test]
  fn regenerating_clears_previous_result() {
    let resolved = awaiting(Some("s1"))
      .apply(Event::AnswerSubmitted { raw: "8".into() }).unwrap()
      .apply(Event::SubmissionResolved { feedback: "ok".into() }).unwrap();
    assert_eq!(resolved.apply(Event::AnswerSubmitted { raw: "8".into() }), Err(Rejected::AlreadyAnswered));
    let next = resolved.apply(Event::GenerateRequested).unwrap();
    assert_eq!(next, View::default().apply(Event::GenerateRequested).unwrap());
    assert!(next.problem().is_none());
  }
}
