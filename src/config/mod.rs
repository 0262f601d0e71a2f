//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Values given on the command line take precedence over the file.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::bucket::WorkerCount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use validator::UsageError;

/// Complete run configuration, validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Number of values to generate and sort
    pub size: usize,
    /// Number of ranks, coordinator included
    pub workers: WorkerCount,
    /// Seed for the dataset generator (entropy when absent)
    pub seed: Option<u64>,
    /// Longest list printed in full
    pub display_limit: usize,
    /// Check the result after sorting
    pub verify: bool,
    /// Write a JSON run summary to this path
    pub json_output: Option<PathBuf>,
}

/// Configuration file contents
///
/// Every field is optional; the command line fills in or overrides them.
///
/// ```toml
/// size = 1000
/// workers = 4
/// seed = 42
/// display_limit = 100
/// verify = true
/// json_output = "summary.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub display_limit: Option<usize>,
    #[serde(default)]
    pub verify: Option<bool>,
    #[serde(default)]
    pub json_output: Option<PathBuf>,
}

/// Lists longer than this are not printed
pub fn default_display_limit() -> usize {
    100
}

/// One rank per CPU when the worker count is not given
pub fn default_workers() -> usize {
    num_cpus::get()
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Array size: {}", self.size)?;
        writeln!(f, "Ranks: {}", self.workers)?;
        match self.seed {
            Some(seed) => writeln!(f, "Seed: {}", seed)?,
            None => writeln!(f, "Seed: random")?,
        }
        writeln!(f, "Display limit: {}", self.display_limit)?;
        write!(f, "Verify: {}", self.verify)
    }
}
