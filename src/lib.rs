//! Math Coach · Primary 5 word-problem trainer
//!
//! - `routes`, `logic`, `gemini`, `repair`: the HTTP server that generates problems
//!   and feedback through Gemini
//! - `view`, `orchestrator`, `client`, `store`: the quiz front end that drives one
//!   round and persists sessions/submissions

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod gemini;
pub mod logic;
pub mod orchestrator;
pub mod protocol;
pub mod repair;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
pub mod view;
