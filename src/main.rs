//! Math Coach · word-problem server
//!
//! - Axum HTTP API (`/api/generate-problem`, `/api/feedback`, `/api/health`)
//! - Gemini integration (via environment variables)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   GEMINI_API_KEY   : provider key; without it every provider call fails
//!   GEMINI_BASE_URL  : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL     : default "gemini-2.5-flash"
//!   APP_CONFIG_PATH  : path to TOML config (prompts)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};

use math_coach::config::AppConfig;
use math_coach::routes::build_router;
use math_coach::state::AppState;
use math_coach::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing(telemetry::SERVER_DEFAULT_FILTER);

  let cfg = AppConfig::from_env();
  let state = Arc::new(AppState::from_config(&cfg));
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port()));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "math_coach", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "math_coach", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "math_coach", error = %e, "Could not install Ctrl-C handler");
    std::future::pending::<()>().await;
  }
}
