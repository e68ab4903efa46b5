//! HTTP client for the math-coach server, used by the quiz front end.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::domain::Problem;
use crate::error::ApiError;
use crate::protocol::{ErrorOut, FeedbackIn, FeedbackOut};

#[async_trait]
pub trait ProblemApi: Send + Sync {
  async fn fetch_problem(&self) -> Result<Problem, ApiError>;
  async fn fetch_feedback(&self, req: &FeedbackIn) -> Result<String, ApiError>;
}

#[derive(Clone)]
pub struct HttpApi {
  client: reqwest::Client,
  base_url: String,
}

impl HttpApi {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self { client: reqwest::Client::new(), base_url: base_url.into().trim_end_matches('/').to_string() }
  }

  async fn read<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
    let status = res.status();
    if !status.is_success() {
      let body = res.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ErrorOut>(&body).map(|e| e.error).unwrap_or(body);
      return Err(ApiError::Status { status, message });
    }
    Ok(res.json::<T>().await?)
  }
}

#[async_trait]
impl ProblemApi for HttpApi {
  #[instrument(level = "debug", skip(self))]
  async fn fetch_problem(&self) -> Result<Problem, ApiError> {
    let res = self.client.post(format!("{}/api/generate-problem", self.base_url))
      .header(USER_AGENT, "math-coach-quiz/0.1")
      .send().await?;
    Self::read(res).await
  }

  #[instrument(level = "debug", skip(self, req))]
  async fn fetch_feedback(&self, req: &FeedbackIn) -> Result<String, ApiError> {
    let res = self.client.post(format!("{}/api/feedback", self.base_url))
      .header(USER_AGENT, "math-coach-quiz/0.1")
      .json(req)
      .send().await?;
    Ok(Self::read::<FeedbackOut>(res).await?.feedback)
  }
}
