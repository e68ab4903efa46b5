//! Session store: write-only persistence of generated problems (sessions) and
//! submitted answers.
//!
//! `Supabase` talks to the PostgREST API of a managed Postgres with the public
//! (anon) key. `InMemoryStore` keeps everything in process, for tests and for
//! running the quiz without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{Problem, Session, SessionId, Submission};
use crate::error::PersistenceError;

pub const SESSIONS_TABLE: &str = "math_problem_sessions";
pub const SUBMISSIONS_TABLE: &str = "math_problem_submissions";

#[async_trait]
pub trait SessionStore: Send + Sync {
  /// Persist a freshly generated problem and return its id.
  async fn create_session(&self, problem: &Problem) -> Result<SessionId, PersistenceError>;
  async fn record_submission(&self, submission: &Submission) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
  async fn create_session(&self, problem: &Problem) -> Result<SessionId, PersistenceError> {
    (**self).create_session(problem).await
  }

  async fn record_submission(&self, submission: &Submission) -> Result<(), PersistenceError> {
    (**self).record_submission(submission).await
  }
}

#[derive(Clone, Debug, Default)]
pub struct SupabaseConfig {
  pub url: Option<String>,
  pub anon_key: Option<String>,
}

#[derive(Clone)]
pub struct Supabase {
  client: reqwest::Client,
  config: SupabaseConfig,
}

#[derive(Serialize)]
struct NewSession<'a> {
  problem_text: &'a str,
  final_answer: f64,
}

#[derive(Deserialize)]
struct InsertedRow {
  id: Value,
}

impl Supabase {
  pub fn new(config: SupabaseConfig) -> Self {
    Self { client: reqwest::Client::new(), config }
  }

  fn endpoint(&self, table: &str) -> Result<(String, &str), PersistenceError> {
    match (&self.config.url, &self.config.anon_key) {
      (Some(url), Some(key)) => Ok((format!("{}/rest/v1/{}", url.trim_end_matches('/'), table), key.as_str())),
      _ => Err(PersistenceError::NotConfigured),
    }
  }

  async fn insert<T: Serialize + ?Sized>(
    &self,
    table: &str,
    rows: &T,
    prefer: &str,
    select: Option<&str>,
  ) -> Result<String, PersistenceError> {
    let (url, key) = self.endpoint(table)?;
    let mut req = self.client.post(&url)
      .header("apikey", key)
      .header(AUTHORIZATION, format!("Bearer {}", key))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", prefer)
      .json(rows);
    if let Some(cols) = select {
      req = req.query(&[("select", cols)]);
    }
    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    if !status.is_success() {
      return Err(PersistenceError::Status { status, body });
    }
    Ok(body)
  }
}

#[async_trait]
impl SessionStore for Supabase {
  #[instrument(level = "info", skip(self, problem), fields(table = SESSIONS_TABLE))]
  async fn create_session(&self, problem: &Problem) -> Result<SessionId, PersistenceError> {
    let row = [NewSession { problem_text: &problem.problem_text, final_answer: problem.final_answer }];
    let body = self.insert(SESSIONS_TABLE, &row, "return=representation", Some("id")).await?;
    let id = session_id_from_body(&body)?;
    debug!(target: "store", session_id = %id, "Session inserted");
    Ok(id)
  }

  #[instrument(level = "info", skip(self, submission), fields(table = SUBMISSIONS_TABLE, session_id = %submission.session_id))]
  async fn record_submission(&self, submission: &Submission) -> Result<(), PersistenceError> {
    self.insert(SUBMISSIONS_TABLE, std::slice::from_ref(submission), "return=minimal", None).await?;
    Ok(())
  }
}

/// PostgREST answers an insert with `return=representation` as an array of rows.
fn session_id_from_body(body: &str) -> Result<SessionId, PersistenceError> {
  let rows: Vec<InsertedRow> = serde_json::from_str(body)
    .map_err(|e| PersistenceError::MalformedResponse(e.to_string()))?;
  let row = rows.into_iter().next()
    .ok_or_else(|| PersistenceError::MalformedResponse("no row returned".into()))?;
  match row.id {
    Value::String(s) => Ok(SessionId::new(s)),
    Value::Number(n) => Ok(SessionId::new(n.to_string())),
    other => Err(PersistenceError::MalformedResponse(format!("unexpected id: {other}"))),
  }
}

/// Process-local store. Enforces that submissions reference an existing session.
#[derive(Clone, Default)]
pub struct InMemoryStore {
  inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
  sessions: HashMap<SessionId, Session>,
  submissions: Vec<Submission>,
}

impl InMemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn session(&self, id: &SessionId) -> Option<Session> {
    self.lock().ok()?.sessions.get(id).cloned()
  }

  pub fn submissions(&self) -> Vec<Submission> {
    self.lock().map(|t| t.submissions.clone()).unwrap_or_default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, PersistenceError> {
    self.inner.lock().map_err(|_| PersistenceError::MalformedResponse("store lock poisoned".into()))
  }
}

#[async_trait]
impl SessionStore for InMemoryStore {
  async fn create_session(&self, problem: &Problem) -> Result<SessionId, PersistenceError> {
    let id = SessionId::new(Uuid::new_v4().to_string());
    let session = Session {
      id: id.clone(),
      problem_text: problem.problem_text.clone(),
      final_answer: problem.final_answer,
    };
    self.lock()?.sessions.insert(id.clone(), session);
    Ok(id)
  }

  async fn record_submission(&self, submission: &Submission) -> Result<(), PersistenceError> {
    let mut tables = self.lock()?;
    if !tables.sessions.contains_key(&submission.session_id) {
      return Err(PersistenceError::MalformedResponse(format!("unknown session {}", submission.session_id)));
    }
    tables.submissions.push(submission.clone());
    Ok(())
  }
}
