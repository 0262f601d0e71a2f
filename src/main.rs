//! bucketsort CLI entry point

use anyhow::{Context, Result};
use bucketsort::config::cli::{Cli, ExecutionMode};
use bucketsort::config::SortConfig;
use bucketsort::coordinator::LocalCoordinator;
use bucketsort::distributed::{DistributedCoordinator, NodeService};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    match cli.mode {
        ExecutionMode::Standalone => run_standalone(&cli),
        ExecutionMode::Coordinator => run_coordinator(&cli),
        ExecutionMode::Service => run_service(&cli),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default level
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_target(false)
        .init();
}

/// Run every rank in this process
fn run_standalone(cli: &Cli) -> Result<()> {
    let config = SortConfig::from_cli(cli)?;
    tracing::debug!(%config, "standalone configuration");

    LocalCoordinator::new(config).run()?;
    Ok(())
}

/// Run rank 0 against remote worker services
fn run_coordinator(cli: &Cli) -> Result<()> {
    let config = SortConfig::from_cli(cli)?;
    tracing::debug!(%config, "coordinator configuration");

    let coordinator = DistributedCoordinator::new(Arc::new(config), cli.node_addresses())
        .context("Failed to create coordinator")?;
    coordinator.run()?;
    Ok(())
}

/// Serve worker ranks until killed
fn run_service(cli: &Cli) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let service = NodeService::new(cli.listen_port)?;
        service.run().await
    })
}
