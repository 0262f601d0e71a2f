//! Standalone launcher
//!
//! Runs every rank inside this process: rank 0 on the calling thread, each
//! worker rank on its own thread, linked to rank 0 by rendezvous channels.

use super::run_rank_zero;
use crate::bucket::{BucketWorker, Rank, SortOutcome, COORDINATOR_RANK};
use crate::config::SortConfig;
use crate::distributed::channel::LocalChannel;
use anyhow::{Context, Result};
use std::thread::{self, JoinHandle};

/// In-process rank group
pub struct LocalCoordinator {
    config: SortConfig,
}

impl LocalCoordinator {
    pub fn new(config: SortConfig) -> Self {
        Self { config }
    }

    /// Start all worker ranks, run rank 0, and wait for every worker
    ///
    /// If rank 0 fails, its channel ends are dropped, so any worker still
    /// waiting on it sees a disconnect and exits.
    pub fn run(&self) -> Result<SortOutcome> {
        let mut channels = Vec::new();
        let mut handles: Vec<(Rank, JoinHandle<Result<usize>>)> = Vec::new();

        for rank in self.config.workers.worker_ranks() {
            let (to_worker, to_coordinator) = LocalChannel::pair(COORDINATOR_RANK, rank);
            let display_limit = self.config.display_limit;

            let handle = thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn(move || {
                    BucketWorker::new(rank, to_coordinator)?
                        .with_report(display_limit)
                        .run()
                })
                .with_context(|| format!("Failed to spawn rank {}", rank))?;

            channels.push(to_worker);
            handles.push((rank, handle));
        }

        let result = run_rank_zero(&self.config, channels);

        for (rank, handle) in handles {
            match handle.join() {
                Ok(Ok(count)) => tracing::debug!(rank, count, "worker finished"),
                Ok(Err(e)) if result.is_err() => {
                    tracing::debug!(rank, error = %e, "worker stopped after coordinator failure")
                }
                Ok(Err(e)) => return Err(e.context(format!("Rank {} failed", rank))),
                Err(_) => anyhow::bail!("Rank {} panicked", rank),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::WorkerCount;

    fn config(size: usize, workers: usize, seed: u64) -> SortConfig {
        SortConfig {
            size,
            workers: WorkerCount::new(workers).unwrap(),
            seed: Some(seed),
            display_limit: 0,
            verify: true,
            json_output: None,
        }
    }

    #[test]
    fn test_local_run_sorted() {
        let outcome = LocalCoordinator::new(config(2_000, 4, 11)).run().unwrap();

        assert!(outcome.sorted.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(outcome.bucket_sizes.len(), 4);
        assert_eq!(outcome.sorted.len() + outcome.dropped, 2_000);
    }

    #[test]
    fn test_local_run_single_rank() {
        let outcome = LocalCoordinator::new(config(50, 1, 5)).run().unwrap();
        assert_eq!(outcome.bucket_sizes.len(), 1);
        assert_eq!(outcome.sorted.len() + outcome.dropped, 50);
    }

    #[test]
    fn test_local_run_more_ranks_than_values() {
        // Most buckets are empty; every rank still completes the exchange
        let outcome = LocalCoordinator::new(config(3, 8, 21)).run().unwrap();
        assert_eq!(outcome.bucket_sizes.len(), 8);
        assert_eq!(outcome.bucket_sizes.iter().sum::<usize>(), outcome.sorted.len());
    }
}
