//! Route reconciliation daemon for the subdomain orchestrator.
//!
//! Loads the configuration, opens the subdomain store and keeps the Traefik
//! routes directory in line with the active rows until interrupted.
//!
//! ```text
//! subdomain-sync [--config FILE] [--once]
//! ```
//!
//! The config path may also come from `SUBDOMAIN_ORCHESTRATOR_CONFIG`.
//! `--once` runs a single pass and exits.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use subdomain_orchestrator_app::{AppConfig, AppState};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "subdomain-sync")]
#[command(version)]
#[command(about = "Keeps Traefik route files in line with active subdomains")]
struct Cli {
    /// Configuration file path
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        env = "SUBDOMAIN_ORCHESTRATOR_CONFIG"
    )]
    config: Option<PathBuf>,

    /// Run a single reconciliation pass and exit
    #[arg(long)]
    once: bool,
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let json = config.log.json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)
        .await
        .context("failed to initialise application state")?;

    if !state.route_service.is_enabled() {
        bail!("routing is disabled: set routes.dir or TRAEFIK_ROUTES_DIR");
    }

    if cli.once {
        let report = state.route_service.reconcile_from_store().await?;
        tracing::info!(
            "Sync pass complete: {} created, {} updated, {} deleted, {} failed",
            report.created,
            report.updated,
            report.deleted,
            report.failed
        );
        if report.failed > 0 {
            bail!("{} route(s) could not be reconciled", report.failed);
        }
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let Some(job) = state.route_sync_job(shutdown.clone()) else {
        bail!("route sync is disabled in the configuration");
    };
    let handle = Arc::new(job).start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();
    handle.await.context("route sync job panicked")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("subdomain-sync: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    tracing::info!("Starting subdomain route sync");
    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
