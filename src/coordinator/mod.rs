//! Coordinator rank driver
//!
//! Both execution modes end up here once their channels are wired: the
//! standalone launcher with in-process channels, the distributed coordinator
//! with TCP channels. This module prints the run banner, generates and sorts
//! the dataset, reports timing, and optionally verifies the result and writes
//! a JSON summary.

pub mod local;

pub use local::LocalCoordinator;

use crate::bucket::{BucketCoordinator, SortOutcome};
use crate::config::SortConfig;
use crate::distributed::channel::Channel;
use crate::distribution::uniform::UniformSource;
use crate::output::json::{write_summary, RunSummary};
use crate::output::text::{print_header, print_total_time};
use crate::util::verification::{verify_sort, VerificationResult};
use anyhow::Result;

/// Run rank 0 to completion over already-connected worker channels
pub fn run_rank_zero<C: Channel>(config: &SortConfig, channels: Vec<C>) -> Result<SortOutcome> {
    print_header(config.workers, config.size);

    let mut coordinator = BucketCoordinator::new(config.workers, channels)?
        .with_report(config.display_limit)
        .retain_dataset(config.verify);
    let mut source = UniformSource::from_seed_option(config.seed);

    let mut outcome = coordinator.run(&mut source, config.size)?;
    print_total_time(outcome.elapsed);

    let verification = match outcome.dataset.take() {
        Some(dataset) => Some(verify_outcome(&dataset, &outcome, config)?),
        None => None,
    };

    if let Some(ref path) = config.json_output {
        let summary = RunSummary::new(config, &outcome, verification);
        write_summary(path, &summary, true)?;
        println!("Summary written to {}", path.display());
    }

    Ok(outcome)
}

fn verify_outcome(
    dataset: &[f32],
    outcome: &SortOutcome,
    config: &SortConfig,
) -> Result<VerificationResult> {
    let result = verify_sort(dataset, &outcome.sorted, config.workers);

    match result {
        VerificationResult::Success => {
            println!("Verification passed: {} values sorted", outcome.sorted.len());
            Ok(result)
        }
        VerificationResult::Unsorted { index, left, right } => {
            anyhow::bail!(
                "Verification failed: output decreases at index {} ({} > {})",
                index,
                left,
                right
            )
        }
        VerificationResult::Mismatch { expected, actual, first_difference } => {
            anyhow::bail!(
                "Verification failed: expected {} values, got {} (first difference at {:?})",
                expected,
                actual,
                first_difference
            )
        }
    }
}
