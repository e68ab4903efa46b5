//! Server configuration: provider credentials from the environment, prompts
//! from an optional TOML file.
//!
//! See `FileConfig` and `Prompts` for the expected TOML schema:
//!
//! ```toml
//! [prompts]
//! problem = "..."
//! feedback_template = "... {user_answer} ... {problem_text} ... {final_answer} ..."
//! feedback_fallback = "Good effort!"
//! ```

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PORT: u16 = 3000;

/// Provider settings. A missing key is not a startup error: calls fail instead.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
}

impl Default for GeminiConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      base_url: DEFAULT_GEMINI_BASE_URL.into(),
      model: DEFAULT_GEMINI_MODEL.into(),
    }
  }
}

/// Everything the server needs, resolved once at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
  pub port: Option<u16>,
  pub gemini: GeminiConfig,
  pub prompts: Prompts,
}

impl AppConfig {
  /// Read `PORT`, `GEMINI_*` and `APP_CONFIG_PATH`.
  pub fn from_env() -> Self {
    let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty());
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
    let port = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok());
    let prompts = load_file_config_from_env().map(|c| c.prompts).unwrap_or_default();

    Self { port, gemini: GeminiConfig { api_key, base_url, model }, prompts }
  }

  pub fn port(&self) -> u16 { self.port.unwrap_or(DEFAULT_PORT) }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts sent to the provider. Defaults target Primary 5 students.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub problem: String,
  /// Placeholders: `{user_answer}`, `{problem_text}`, `{final_answer}`.
  pub feedback_template: String,
  pub feedback_fallback: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      problem: "Generate one Primary 5 math word problem suitable for 10-11-year-olds.\n\
It should involve real-world context (money, distance, time, etc.).\n\
Return JSON in this exact format:\n\
{\n  \"problem_text\": \"string\",\n  \"final_answer\": number\n}\n\
Only output valid JSON.".into(),
      feedback_template: "The student answered {user_answer} for this problem:\n\
\"{problem_text}\"\n\
The correct answer is {final_answer}.\n\
Write short, encouraging feedback for a Primary 5 student.".into(),
      feedback_fallback: "Good effort!".into(),
    }
  }
}

/// Attempt to load `FileConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_file_config_from_env() -> Option<FileConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<FileConfig>(&s) {
      Ok(cfg) => {
        info!(target: "math_coach", %path, "Loaded prompt config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "math_coach", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "math_coach", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
