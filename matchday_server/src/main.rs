//! Tournament roster HTTP server.
//!
//! Serves the JSON API on top of PostgreSQL, or on top of an in-memory store
//! with `--in-memory`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use matchday::db::{Database, MemoryRepository, Repository};
use matchday_server::{
    api::{self, AppState},
    bootstrap,
    config::ServerConfig,
    logging, metrics,
};
use pico_args::Arguments;

const HELP: &str = "\
Run the matchday tournament roster server

USAGE:
  matchday_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --in-memory              Keep all state in process memory (nothing is persisted)
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret, at least 32 characters (required)
  ACCESS_TOKEN_MINUTES     Access token lifetime
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  BOOTSTRAP_ADMIN_EMAIL    Administrator created at startup
  BOOTSTRAP_ADMIN_PASSWORD
  BOOTSTRAP_ADMIN_NAME
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        in_memory: pargs.contains("--in-memory"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.in_memory)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr)
            .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
        tracing::info!("Metrics exported on http://{}/metrics", addr);
    }

    let (repo, database): (Arc<dyn Repository>, Option<Database>) = if config.in_memory {
        tracing::warn!("Using the in-memory store, nothing will be persisted");
        (Arc::new(MemoryRepository::new()), None)
    } else {
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to apply migrations")?;
        tracing::info!("Database connected and migrated");
        (Arc::new(db.repository()), Some(db))
    };

    let state = AppState::new(repo, &config.security);

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(&state.accounts, admin)
            .await
            .context("Failed to create bootstrap administrator")?;
    }

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
