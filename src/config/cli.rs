//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Standalone mode (default) - every rank is a thread in this process
    Standalone,
    /// Coordinator mode - rank 0, drives worker services over TCP
    Coordinator,
    /// Service mode - worker rank, waits for a coordinator
    Service,
}

/// bucketsort - distributed bucket sort of random floats in [0, 1)
#[derive(Parser, Debug)]
#[command(name = "bucketsort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: standalone, coordinator, or service
    #[arg(long, value_enum, default_value = "standalone")]
    pub mode: ExecutionMode,

    /// Number of values to sort (the list size n)
    ///
    /// Not used in service mode (the coordinator owns the dataset)
    #[arg(value_name = "N", allow_negative_numbers = true)]
    pub size: Option<i64>,

    /// Number of ranks in standalone mode, coordinator included (default: CPU count)
    #[arg(short = 'p', long)]
    pub workers: Option<usize>,

    /// Seed for the dataset generator
    #[arg(long, env = "BUCKETSORT_SEED")]
    pub seed: Option<u64>,

    /// Longest list printed in full
    #[arg(long)]
    pub display_limit: Option<usize>,

    /// Verify the sorted result against the input
    #[arg(long)]
    pub verify: bool,

    /// Write a JSON run summary to this file
    #[arg(long, value_name = "PATH")]
    pub json_output: Option<PathBuf>,

    /// TOML configuration file (command-line values take precedence)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Comma-separated worker service addresses, in rank order (coordinator mode)
    /// e.g. "10.0.1.10:9999,10.0.1.11:9999"
    #[arg(long)]
    pub host_list: Option<String>,

    /// Port for service to listen on (service mode only)
    #[arg(long, default_value = "9999")]
    pub listen_port: u16,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Worker service addresses from `--host-list`, in rank order
    pub fn node_addresses(&self) -> Vec<String> {
        self.host_list
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|addr| !addr.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
