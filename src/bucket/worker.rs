//! Worker rank
//!
//! Receives the bucket size, then the bucket, sorts it and sends it back.
//! The size is not sent back; the coordinator recorded it when distributing.

use super::{Phase, Rank, COORDINATOR_RANK};
use crate::distributed::channel::Channel;
use crate::distributed::protocol::Message;
use crate::output::text::{print_received_bucket, print_sorted_bucket};
use crate::sort::sort_bucket;
use anyhow::{Context, Result};

/// Worker side of the bucket sort
pub struct BucketWorker<C: Channel> {
    rank: Rank,
    channel: C,
    display_limit: Option<usize>,
    phase: Phase,
}

impl<C: Channel> BucketWorker<C> {
    /// Create the worker for `rank`, talking to the coordinator over `channel`
    pub fn new(rank: Rank, channel: C) -> Result<Self> {
        if rank == COORDINATOR_RANK {
            anyhow::bail!("rank {} is the coordinator, not a worker", rank);
        }
        if channel.peer() != COORDINATOR_RANK {
            anyhow::bail!("worker channel must lead to the coordinator, not rank {}", channel.peer());
        }

        Ok(Self {
            rank,
            channel,
            display_limit: None,
            phase: Phase::Init,
        })
    }

    /// Print the received and sorted bucket, up to `display_limit` values
    pub fn with_report(mut self, display_limit: usize) -> Self {
        self.display_limit = Some(display_limit);
        self
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the worker protocol once; returns the number of values sorted
    pub fn run(&mut self) -> Result<usize> {
        self.enter(Phase::AwaitSize);
        let size = self
            .channel
            .receive()
            .context("Failed to receive bucket size")?
            .into_bucket_size()?;

        self.enter(Phase::AwaitData);
        let mut bucket = self
            .channel
            .receive()
            .context("Failed to receive bucket")?
            .into_bucket()?;
        tracing::debug!(rank = self.rank, size, received = bucket.len(), "bucket received");

        if let Some(limit) = self.display_limit {
            print_received_bucket(self.rank, size, &bucket, limit);
        }

        self.enter(Phase::Sort);
        sort_bucket(&mut bucket);

        if let Some(limit) = self.display_limit {
            print_sorted_bucket(self.rank, &bucket, limit);
        }

        self.enter(Phase::Send);
        let count = bucket.len();
        self.channel
            .send(Message::Bucket(bucket))
            .context("Failed to send sorted bucket")?;

        self.enter(Phase::Done);
        Ok(count)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(rank = self.rank, from = ?self.phase, to = ?phase, "worker phase");
        self.phase = phase;
    }
}
