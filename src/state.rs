//! Application state shared by every request: prompts, the repair chain and the
//! provider gateway. Nothing in here is mutated after startup.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{AppConfig, Prompts};
use crate::gemini::{Gemini, LlmGateway};
use crate::repair::RepairChain;

pub struct AppState {
  pub gateway: Arc<dyn LlmGateway>,
  pub prompts: Prompts,
  pub repair: RepairChain,
}

impl AppState {
  /// Build state from resolved configuration.
  #[instrument(level = "info", skip_all)]
  pub fn from_config(cfg: &AppConfig) -> Self {
    let gemini = Gemini::new(cfg.gemini.clone());
    if gemini.enabled() {
      info!(target: "math_coach", base_url = %gemini.base_url(), model = %gemini.model(), "Gemini enabled.");
    } else {
      warn!(target: "math_coach", "GEMINI_API_KEY not set; provider calls will fail.");
    }
    Self::new(Arc::new(gemini), cfg.prompts.clone())
  }

  pub fn new(gateway: Arc<dyn LlmGateway>, prompts: Prompts) -> Self {
    Self { gateway, prompts, repair: RepairChain::default() }
  }
}
