//! JSON run summary
//!
//! Written once by the coordinator rank when `--json-output` is given.

use crate::bucket::SortOutcome;
use crate::config::SortConfig;
use crate::util::time::{format_duration, sort_rate};
use crate::util::verification::VerificationResult;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

/// Summary of one complete sort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub size: usize,
    pub workers: usize,
    pub seed: Option<u64>,
    pub bucket_sizes: Vec<usize>,
    pub dropped: usize,
    pub elapsed: JsonDuration,
    pub values_per_sec: f64,
    /// Present only when verification ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationResult>,
}

impl RunSummary {
    pub fn new(
        config: &SortConfig,
        outcome: &SortOutcome,
        verification: Option<VerificationResult>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            size: config.size,
            workers: config.workers.get(),
            seed: config.seed,
            bucket_sizes: outcome.bucket_sizes.clone(),
            dropped: outcome.dropped,
            elapsed: JsonDuration::from_duration(outcome.elapsed),
            values_per_sec: sort_rate(outcome.sorted.len(), outcome.elapsed),
            verification,
        }
    }
}

/// Write the summary to `output_path`
pub fn write_summary(output_path: &Path, summary: &RunSummary, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output: {}", output_path.display()))?;

    if pretty {
        serde_json::to_writer_pretty(file, summary)?;
    } else {
        serde_json::to_writer(file, summary)?;
    }

    Ok(())
}
