//! Coordinator rank
//!
//! Rank 0 owns the dataset. It partitions it, hands bucket `r` to worker
//! rank `r`, sorts bucket 0 itself without a round-trip, collects every
//! sorted bucket back and concatenates them in rank order.
//!
//! Buckets are moved into the channel on distribution and only come back on
//! collection, so the coordinator cannot touch a bucket while a worker owns it.
//!
//! A returned bucket is not checked against the size that was sent; whatever
//! arrives is concatenated. Any channel error is fatal for the run.

use super::{concatenate, Buckets, Phase, Rank, SortOutcome, WorkerCount};
use crate::distributed::channel::Channel;
use crate::distributed::protocol::Message;
use crate::distribution::ValueSource;
use crate::output::text::{print_dropped, print_list};
use crate::sort::sort_bucket;
use anyhow::{Context, Result};
use std::time::Instant;

/// Coordinator side of the bucket sort
///
/// Holds one channel per worker rank, ordered by rank (`channels[i]` leads to
/// rank `i + 1`).
pub struct BucketCoordinator<C: Channel> {
    workers: WorkerCount,
    channels: Vec<C>,
    display_limit: Option<usize>,
    retain_dataset: bool,
    phase: Phase,
}

impl<C: Channel> BucketCoordinator<C> {
    /// Create a coordinator for `workers` ranks
    ///
    /// Fails unless there is exactly one channel per worker rank, in rank order.
    pub fn new(workers: WorkerCount, channels: Vec<C>) -> Result<Self> {
        if channels.len() != workers.worker_ranks().len() {
            anyhow::bail!(
                "{} ranks need {} worker channels, got {}",
                workers,
                workers.worker_ranks().len(),
                channels.len()
            );
        }

        for (rank, channel) in workers.worker_ranks().zip(&channels) {
            if channel.peer() != rank {
                anyhow::bail!("channel for rank {} leads to rank {}", rank, channel.peer());
            }
        }

        Ok(Self {
            workers,
            channels,
            display_limit: None,
            retain_dataset: false,
            phase: Phase::Init,
        })
    }

    /// Print the full and sorted lists, up to `display_limit` values
    pub fn with_report(mut self, display_limit: usize) -> Self {
        self.display_limit = Some(display_limit);
        self
    }

    /// Keep a copy of the unsorted dataset in the outcome
    pub fn retain_dataset(mut self, retain: bool) -> Self {
        self.retain_dataset = retain;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn workers(&self) -> WorkerCount {
        self.workers
    }

    /// Generate `n` values from `source` and sort them across all ranks
    pub fn run(&mut self, source: &mut dyn ValueSource, n: usize) -> Result<SortOutcome> {
        let start = Instant::now();

        self.enter(Phase::Generate);
        let dataset = source.generate(n);

        self.execute(dataset, start)
    }

    /// Sort an existing dataset across all ranks
    pub fn sort_dataset(&mut self, dataset: Vec<f32>) -> Result<SortOutcome> {
        self.execute(dataset, Instant::now())
    }

    fn execute(&mut self, dataset: Vec<f32>, start: Instant) -> Result<SortOutcome> {
        if let Some(limit) = self.display_limit {
            print_list("Full list:", &dataset, limit);
        }

        self.enter(Phase::Partition);
        let buckets = Buckets::partition(&dataset, self.workers);
        let bucket_sizes = buckets.sizes();
        let dropped = buckets.dropped();
        if dropped > 0 {
            tracing::warn!(dropped, "values outside every bucket range were discarded");
        }
        tracing::debug!(?bucket_sizes, "dataset partitioned");

        let retained = self.retain_dataset.then_some(dataset);
        let mut buckets = buckets.into_inner();

        self.enter(Phase::Distribute);
        self.distribute(&mut buckets)?;

        self.enter(Phase::Sort);
        sort_bucket(&mut buckets[0]);

        self.enter(Phase::Collect);
        self.collect(&mut buckets)?;

        self.enter(Phase::Concatenate);
        let sorted = concatenate(buckets);
        let elapsed = start.elapsed();

        if let Some(limit) = self.display_limit {
            print_list("Final sorted List:", &sorted, limit);
            print_dropped(dropped);
        }

        self.enter(Phase::Done);

        Ok(SortOutcome {
            sorted,
            dataset: retained,
            bucket_sizes,
            dropped,
            elapsed,
        })
    }

    /// Send every worker its bucket size, then the bucket itself
    fn distribute(&mut self, buckets: &mut [Vec<f32>]) -> Result<()> {
        for (rank, channel) in self.workers.worker_ranks().zip(self.channels.iter_mut()) {
            let bucket = std::mem::take(&mut buckets[rank]);
            let count = bucket.len() as u64;

            channel
                .send(Message::BucketSize(count))
                .with_context(|| format!("Failed to send bucket size to rank {}", rank))?;
            channel
                .send(Message::Bucket(bucket))
                .with_context(|| format!("Failed to send bucket to rank {}", rank))?;

            tracing::debug!(rank, count, "bucket distributed");
        }
        Ok(())
    }

    /// Receive every worker's sorted bucket, in rank order
    fn collect(&mut self, buckets: &mut [Vec<f32>]) -> Result<()> {
        for (rank, channel) in self.workers.worker_ranks().zip(self.channels.iter_mut()) {
            let sorted = receive_bucket(channel, rank)?;
            tracing::debug!(rank, count = sorted.len(), "sorted bucket collected");
            buckets[rank] = sorted;
        }
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "coordinator phase");
        self.phase = phase;
    }
}

fn receive_bucket<C: Channel>(channel: &mut C, rank: Rank) -> Result<Vec<f32>> {
    let msg = channel
        .receive()
        .with_context(|| format!("Failed to receive sorted bucket from rank {}", rank))?;
    let values = msg
        .into_bucket()
        .with_context(|| format!("Bad reply from rank {}", rank))?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::channel::LocalChannel;
    use crate::distribution::ReplaySource;

    #[test]
    fn test_single_rank_sorts_locally() {
        let workers = WorkerCount::new(1).unwrap();
        let mut coordinator = BucketCoordinator::<LocalChannel>::new(workers, Vec::new()).unwrap();

        let outcome = coordinator.sort_dataset(vec![0.5, 0.1, 0.9]).unwrap();

        assert_eq!(outcome.sorted, vec![0.1, 0.5, 0.9]);
        assert_eq!(outcome.bucket_sizes, vec![3]);
        assert_eq!(coordinator.phase(), Phase::Done);
    }

    #[test]
    fn test_run_generates_from_source() {
        let workers = WorkerCount::new(1).unwrap();
        let mut coordinator = BucketCoordinator::<LocalChannel>::new(workers, Vec::new())
            .unwrap()
            .retain_dataset(true);
        let mut source = ReplaySource::new(vec![0.75, 0.25, 0.5]);

        let outcome = coordinator.run(&mut source, 4).unwrap();

        assert_eq!(outcome.dataset, Some(vec![0.75, 0.25, 0.5, 0.75]));
        assert_eq!(outcome.sorted, vec![0.25, 0.5, 0.75, 0.75]);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let workers = WorkerCount::new(3).unwrap();
        let (a, _b) = LocalChannel::pair(0, 1);
        assert!(BucketCoordinator::new(workers, vec![a]).is_err());
    }

    #[test]
    fn test_channel_order_mismatch() {
        let workers = WorkerCount::new(3).unwrap();
        let (to_two, _two) = LocalChannel::pair(0, 2);
        let (to_one, _one) = LocalChannel::pair(0, 1);
        assert!(BucketCoordinator::new(workers, vec![to_two, to_one]).is_err());
    }

    #[test]
    fn test_disconnected_worker_is_fatal() {
        let workers = WorkerCount::new(2).unwrap();
        let (to_one, one) = LocalChannel::pair(0, 1);
        drop(one);

        let mut coordinator = BucketCoordinator::new(workers, vec![to_one]).unwrap();
        assert!(coordinator.sort_dataset(vec![0.2, 0.7]).is_err());
        assert_eq!(coordinator.phase(), Phase::Distribute);
    }
}
