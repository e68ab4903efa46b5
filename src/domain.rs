//! Domain models: generated problems, persisted sessions and submissions.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One generated word problem. The serialized shape is also the success body
/// of `POST /api/generate-problem`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
  pub problem_text: String,
  #[serde(serialize_with = "serialize_number")]
  pub final_answer: f64,
}

/// Whole numbers travel as integers so clients and prompts read "8", not "8.0".
pub fn number_value(n: f64) -> Value {
  if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
    Value::from(n as i64)
  } else {
    Value::from(n)
  }
}

fn serialize_number<S: Serializer>(n: &f64, s: S) -> Result<S::Ok, S::Error> {
  number_value(*n).serialize(s)
}

/// Opaque identifier handed out by the session store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
  pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A persisted problem. Exists before any submission that references it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Session {
  pub id: SessionId,
  pub problem_text: String,
  pub final_answer: f64,
}

/// One answer attempt against a session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Submission {
  pub session_id: SessionId,
  pub user_answer: f64,
  pub is_correct: bool,
  pub feedback_text: String,
}

/// Parse what the student typed. Empty or non-numeric input yields `None`.
pub fn parse_answer(raw: &str) -> Option<f64> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Exact numeric equality, no tolerance.
pub fn is_correct(user_answer: f64, final_answer: f64) -> bool {
  user_answer == final_answer
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_values_in_different_spellings_are_correct() {
    let n = parse_answer("10.0").unwrap();
    assert!(is_correct(n, 10.0));
    let n = parse_answer(" 8 ").unwrap();
    assert!(is_correct(n, 8.0));
  }

  #[test]
  fn near_misses_are_wrong() {
    let n = parse_answer("10.01").unwrap();
    assert!(!is_correct(n, 10.0));
  }

  #[test]
  fn rejects_blank_and_non_numeric_answers() {
    assert_eq!(parse_answer(""), None);
    assert_eq!(parse_answer("   "), None);
    assert_eq!(parse_answer("eight"), None);
    assert_eq!(parse_answer("NaN"), None);
    assert_eq!(parse_answer("inf"), None);
  }

  #[test]
  fn whole_answers_serialize_as_integers() {
    let p = Problem { problem_text: "a".into(), final_answer: 8.0 };
    assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"problem_text":"a","final_answer":8}"#);
    let p = Problem { problem_text: "a".into(), final_answer: 2.5 };
    assert_eq!(serde_json::to_string(&p).unwrap(), r#"{"problem_text":"a","final_answer":2.5}"#);
  }

  #[test]
  fn session_id_serializes_as_plain_string() {
    let id = SessionId::new("abc");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
  }
}
