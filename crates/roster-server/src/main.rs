//! roster server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite person store, and serves the JSON API over HTTP.
//!
//! # Importing face-grouping output
//!
//! ```
//! cargo run -p roster-server -- import-faces faces.json
//! cargo run -p roster-server -- import-matches matches.json
//! ```
//!
//! Both files hold a JSON array of rows.

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_core::face::{Face, MatchMember};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Roster person store server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Upsert faces from a JSON array file.
  ImportFaces { path: PathBuf },
  /// Add match memberships from a JSON array file.
  ImportMatches { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, &server_cfg).await,
    Command::ImportFaces { path } => {
      let faces: Vec<Face> = read_json(&path)?;
      let written = store.import_faces(faces).await?;
      println!("imported {written} faces from {}", path.display());
      Ok(())
    }
    Command::ImportMatches { path } => {
      let members: Vec<MatchMember> = read_json(&path)?;
      let written = store.import_match_members(members).await?;
      println!("imported {written} match members from {}", path.display());
      Ok(())
    }
  }
}

async fn serve(store: SqliteStore, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = roster_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
