//! Turning provider text into a `Problem`.
//!
//! Strategies are tried in order and the first success wins. Models like to wrap
//! JSON in prose or code fences, so a strict parse is followed by a brace-span
//! extraction.

use tracing::debug;

use crate::domain::Problem;

pub trait ParseStrategy: Send + Sync {
  fn name(&self) -> &'static str;
  fn parse(&self, text: &str) -> Option<Problem>;
}

/// The whole text must be the JSON object.
pub struct StrictJson;

/// The span from the first `{` to the last `}`.
pub struct BraceSpan;

impl ParseStrategy for StrictJson {
  fn name(&self) -> &'static str { "strict_json" }

  fn parse(&self, text: &str) -> Option<Problem> {
    decode(text.trim())
  }
}

impl ParseStrategy for BraceSpan {
  fn name(&self) -> &'static str { "brace_span" }

  fn parse(&self, text: &str) -> Option<Problem> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
      return None;
    }
    decode(&text[start..=end])
  }
}

fn decode(candidate: &str) -> Option<Problem> {
  serde_json::from_str::<Problem>(candidate)
    .ok()
    .filter(|p| !p.problem_text.trim().is_empty() && p.final_answer.is_finite())
}

/// Ordered list of strategies.
pub struct RepairChain {
  strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Default for RepairChain {
  fn default() -> Self {
    Self { strategies: vec![Box::new(StrictJson), Box::new(BraceSpan)] }
  }
}

impl RepairChain {
  pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self { Self { strategies } }

  pub fn parse(&self, text: &str) -> Option<Problem> {
    self.strategies.iter().find_map(|s| {
      let out = s.parse(text);
      debug!(target: "problem", strategy = s.name(), ok = out.is_some(), "parse attempt");
      out
    })
  }
}
