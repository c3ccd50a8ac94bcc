//! CineTrunk server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `CINETRUNK_*`
//! environment overrides, opens the SQLite store, starts the activity reaper
//! and serves the JSON API under `/api`.

mod reaper;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use cinetrunk_api::{
  AppState,
  auth::AuthConfig,
  moviedb::MovieDbClient,
};
use cinetrunk_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "CineTrunk API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Purge expired activities once and exit.
  #[arg(long)]
  purge_expired: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  // Open SQLite store.
  let store_path = server_cfg.resolved_store_path();
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  // Helper mode: one sweep and exit.
  if cli.purge_expired {
    let removed = reaper::sweep(store.as_ref()).await;
    tracing::info!(removed, "purged expired activities");
    return Ok(());
  }

  if server_cfg.movie_db.api_key.is_none() {
    tracing::warn!("movie_db.api_key is not set; /api/moviesdb requests will fail");
  }

  // Build application state.
  let state = AppState {
    store:    store.clone(),
    auth:     Arc::new(AuthConfig {
      jwt_secret: server_cfg.jwt_secret.clone(),
      token_ttl:  server_cfg.token_ttl(),
    }),
    movie_db: Arc::new(
      MovieDbClient::new(server_cfg.movie_db.clone())
        .context("failed to build movie database client")?,
    ),
  };

  let _reaper = reaper::spawn(store, server_cfg.reap_interval());

  let app = Router::new()
    .nest("/api", cinetrunk_api::api_router(state))
    .layer(TimeoutLayer::new(server_cfg.request_timeout()))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
