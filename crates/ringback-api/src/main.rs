//! ringback server binary.
//!
//! Reads `ringback.toml` (or the path given with `--config`) under
//! `RINGBACK_*` environment overrides, opens the SQLite pool, and serves the
//! JSON API under `/api` until interrupted.
//!
//! ```
//! RINGBACK_JWT_SECRET=change-me cargo run -p ringback-api --bin ringback-server
//! ```

use std::{
  path::{Path, PathBuf},
  str::FromStr as _,
  sync::Arc,
};

use anyhow::Context as _;
use chrono::TimeDelta;
use clap::Parser;
use jsonwebtoken::Algorithm;
use ringback_api::{AppState, ServerConfig};
use ringback_auth::TokenService;
use ringback_store_sqlite::Database;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ringback reminder server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ringback.toml")]
  config: PathBuf,
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
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RINGBACK"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig (is RINGBACK_JWT_SECRET set?)")?;

  // Token service.
  let algorithm = Algorithm::from_str(&server_cfg.jwt_algorithm)
    .with_context(|| format!("unknown jwt_algorithm {:?}", server_cfg.jwt_algorithm))?;
  let ttl = TimeDelta::try_minutes(server_cfg.jwt_ttl_minutes)
    .context("jwt_ttl_minutes is out of range")?;
  let tokens = TokenService::new(server_cfg.jwt_secret.as_bytes(), algorithm, ttl)
    .context("invalid token configuration")?;

  if !ringback_auth::credential::warm_up() {
    tracing::warn!("could not prepare the unknown-user hash; failed logins may leak timing");
  }

  // Open the connection pool.
  let db = open_database(&server_cfg).await?;

  let state = AppState { db: db.clone(), tokens: Arc::new(tokens) };
  let app = ringback_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  db.close();
  Ok(())
}

async fn open_database(cfg: &ServerConfig) -> anyhow::Result<Database> {
  let url = cfg
    .database_url
    .strip_prefix("sqlite://")
    .unwrap_or(&cfg.database_url);

  if url == ":memory:" {
    tracing::warn!("using an in-memory database; data will not survive a restart");
    return Database::open_in_memory()
      .await
      .context("failed to open in-memory database");
  }

  let path = expand_tilde(Path::new(url));
  Database::open(&path, cfg.pool_config())
    .await
    .with_context(|| format!("failed to open database at {path:?}"))
}

/// Resolve once Ctrl-C or SIGTERM arrives.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
