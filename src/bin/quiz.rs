//! Terminal front end: one problem at a time, answers typed on stdin.
//!
//!   <enter> or `n`  generate a new problem
//!   a number        answer the current problem
//!   `q`             quit

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use math_coach::client::HttpApi;
use math_coach::orchestrator::Orchestrator;
use math_coach::store::{InMemoryStore, SessionStore, Supabase, SupabaseConfig};
use math_coach::telemetry;
use math_coach::view::View;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
  Supabase,
  Memory,
}

#[derive(Debug, Parser)]
#[command(name = "quiz", about = "Practice Primary 5 math word problems")]
struct Args {
  /// Base URL of the math-coach server.
  #[arg(long, env = "MATH_COACH_SERVER", default_value = "http://127.0.0.1:3000")]
  server: String,

  /// Where sessions and submissions are recorded.
  #[arg(long, value_enum, default_value_t = StoreKind::Supabase)]
  store: StoreKind,

  #[arg(long, env = "SUPABASE_URL")]
  supabase_url: Option<String>,

  #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
  supabase_anon_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing(telemetry::CLIENT_DEFAULT_FILTER);
  let args = Args::parse();

  let store: Arc<dyn SessionStore> = match args.store {
    StoreKind::Supabase => Arc::new(Supabase::new(SupabaseConfig {
      url: args.supabase_url,
      anon_key: args.supabase_anon_key,
    })),
    StoreKind::Memory => Arc::new(InMemoryStore::new()),
  };
  let orch = Orchestrator::new(HttpApi::new(args.server), store);

  println!("🧮 Fun Math Challenge!");
  let mut view = View::default();
  print!("{}", view.render());

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  while let Some(line) = lines.next_line().await? {
    let input = line.trim();
    let next = match input {
      "q" | "quit" => break,
      "" | "n" => {
        println!("🎲 Generating...");
        orch.generate(&view).await
      }
      answer => orch.submit(&view, answer).await,
    };
    match next {
      Ok(v) => {
        view = v;
        print!("{}", view.render());
      }
      Err(rejected) => {
        debug!(%rejected, "input rejected");
        println!("{rejected}");
      }
    }
  }
  Ok(())
}
