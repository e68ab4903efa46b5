//! Error taxonomy shared by the server, the client and the session store.

use thiserror::Error;

/// Failures talking to the generative-language provider.
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("provider API key is not configured")]
  NotConfigured,
  #[error("provider request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("provider HTTP {status}: {message}")]
  Status { status: reqwest::StatusCode, message: String },
  #[error("provider returned an undecodable body: {0}")]
  MalformedResponse(String),
  #[error("provider returned no candidate text")]
  EmptyResponse,
}

/// Failures of the problem generation path.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Gateway(#[from] GatewayError),
  #[error("could not parse provider output")]
  Unparsable { raw: String },
}

/// Failures writing to the session store. Logged, never shown to the student.
#[derive(Debug, Error)]
pub enum PersistenceError {
  #[error("session store is not configured")]
  NotConfigured,
  #[error("session store request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("session store HTTP {status}: {body}")]
  Status { status: reqwest::StatusCode, body: String },
  #[error("session store returned an unexpected body: {0}")]
  MalformedResponse(String),
}

/// Failures of the client's calls to the math-coach server.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("server request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("server HTTP {status}: {message}")]
  Status { status: reqwest::StatusCode, message: String },
}
