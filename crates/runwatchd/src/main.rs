//! runwatchd — the runwatch daemon.
//!
//! Polls Gitea's Actions runs from Postgres, keeps per-repository and
//! per-workflow failure counters, and serves them to Prometheus:
//! - Record source (sqlx pool)
//! - Poller (background task)
//! - HTTP API (`/action-runs`, `/metrics`)
//!
//! # Usage
//!
//! ```text
//! runwatchd serve --port 8080 --update-interval 60 --db-host gitea-db
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use runwatch_metrics::{CounterRegistry, Poller};
use runwatch_state::PgRunSource;

use crate::config::{Config, LogFormat, ServeArgs};

const DEFAULT_LOG_FILTER: &str = "info,runwatchd=debug,runwatch=debug";

#[derive(Parser)]
#[command(name = "runwatchd", about = "Gitea Actions run exporter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the database and serve metrics.
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            init_tracing(args.log_format);
            run_serve(Config::from_args(&args)).await
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    info!("runwatch starting");

    // ── Initialize subsystems ──────────────────────────────────

    let source = PgRunSource::connect(&config.database)
        .await
        .context("connecting to the gitea database")?;
    let source = Arc::new(source);

    let counters = Arc::new(CounterRegistry::new());

    let mut poller = Poller::new(source.clone(), counters.clone())
        .with_interval(config.update_interval)
        .with_fetch_timeout(config.fetch_timeout);
    info!(
        interval_secs = config.update_interval.as_secs(),
        "poller initialized"
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let poller_handle = tokio::spawn(async move {
        poller.run(shutdown_rx).await;
    });

    // ── Start HTTP server ──────────────────────────────────────

    let router = runwatch_api::build_router(source.clone(), counters);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_ctrl_c().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("HTTP server error")?;

    let _ = poller_handle.await;
    source.close().await;

    info!("runwatch stopped");
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install CTRL+C handler");
        std::future::pending::<()>().await;
    }
}
