//! Distributed bucket sort
//!
//! The dataset is split into one numeric range per rank. Bucket `i` holds the
//! values `v` with `lim * i < v <= lim * (i + 1)`, where `lim = 1 / workers`.
//! Rank `i` sorts bucket `i`, so concatenating the sorted buckets in rank
//! order yields a globally sorted sequence: every value in bucket `i` is
//! `<= lim * (i + 1)`, and every value in bucket `i + 1` is `> lim * (i + 1)`.
//!
//! # Boundary behavior
//!
//! The range test is exclusive at the bottom and inclusive at the top:
//!
//! - A value equal to an interior boundary `lim * k` lands in bucket `k - 1`.
//! - `0.0` passes no test and is dropped from the result.
//! - Anything above `lim * workers` (about `1.0`) is dropped as well.
//!
//! Dropped values are counted in [`Buckets::dropped`] and reported, but they
//! are never re-inserted. Whether excluding `0.0` was intended is an open
//! question; the behavior is kept as-is.
//!
//! # Phases
//!
//! ```text
//! coordinator: Init -> Generate -> Partition -> Distribute -> Sort -> Collect -> Concatenate -> Done
//! worker:      Init -> AwaitSize -> AwaitData -> Sort -> Send -> Done
//! ```

pub mod coordinator;
pub mod worker;

pub use coordinator::BucketCoordinator;
pub use worker::BucketWorker;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Duration;

/// Rank of a cooperating process (0 is the coordinator)
pub type Rank = usize;

/// Rank that owns the dataset and orchestrates the sort
pub const COORDINATOR_RANK: Rank = 0;

/// Number of ranks taking part in the sort, coordinator included
///
/// Fixed for the whole run. Also the number of buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerCount(NonZeroUsize);

impl WorkerCount {
    /// Returns `None` for zero
    pub fn new(count: usize) -> Option<Self> {
        NonZeroUsize::new(count).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Width of every bucket's range (`lim`)
    pub fn bucket_width(self) -> f32 {
        1.0 / self.get() as f32
    }

    /// Half-open range `(low, high]` of bucket `index`
    pub fn bounds(self, index: usize) -> (f32, f32) {
        let lim = self.bucket_width();
        (lim * index as f32, lim * (index + 1) as f32)
    }

    /// Ranks that receive a bucket over a channel
    pub fn worker_ranks(self) -> Range<Rank> {
        COORDINATOR_RANK + 1..self.get()
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-rank protocol phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Generate,
    Partition,
    Distribute,
    AwaitSize,
    AwaitData,
    Sort,
    Collect,
    Concatenate,
    Send,
    Done,
}

/// Bucket a value belongs to, if any
///
/// Scans buckets in index order and returns the first whose range test
/// succeeds. Ranges are disjoint, so at most one can.
pub fn bucket_index(value: f32, workers: WorkerCount) -> Option<usize> {
    (0..workers.get()).find(|&j| {
        let (low, high) = workers.bounds(j);
        value > low && value <= high
    })
}

/// Dataset split into one bucket per rank
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    buckets: Vec<Vec<f32>>,
    dropped: usize,
}

impl Buckets {
    /// Partition `dataset` into `workers` buckets
    ///
    /// O(n * workers). Values that fall into no bucket are counted and
    /// discarded.
    pub fn partition(dataset: &[f32], workers: WorkerCount) -> Self {
        let mut buckets = vec![Vec::new(); workers.get()];
        let mut dropped = 0;

        for &value in dataset {
            match bucket_index(value, workers) {
                Some(j) => buckets[j].push(value),
                None => dropped += 1,
            }
        }

        Self { buckets, dropped }
    }

    /// Number of values in each bucket, in rank order
    pub fn sizes(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Number of values that belonged to no bucket
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        self.buckets.get(index).map(Vec::as_slice)
    }

    pub fn into_inner(self) -> Vec<Vec<f32>> {
        self.buckets
    }
}

/// Join sorted buckets in rank order
pub fn concatenate(buckets: Vec<Vec<f32>>) -> Vec<f32> {
    let total = buckets.iter().map(Vec::len).sum();
    let mut sorted = Vec::with_capacity(total);
    for bucket in buckets {
        sorted.extend(bucket);
    }
    sorted
}

/// Result of a complete sort on the coordinator rank
#[derive(Debug, Clone)]
pub struct SortOutcome {
    /// Globally sorted values
    pub sorted: Vec<f32>,

    /// Unsorted input, kept only when requested
    pub dataset: Option<Vec<f32>>,

    /// Bucket sizes recorded at distribution, in rank order
    pub bucket_sizes: Vec<usize>,

    /// Values that fell into no bucket
    pub dropped: usize,

    /// Wall-clock time from generation to concatenation
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> WorkerCount {
        WorkerCount::new(n).unwrap()
    }

    #[test]
    fn test_worker_count_zero() {
        assert!(WorkerCount::new(0).is_none());
        assert_eq!(workers(4).get(), 4);
    }

    #[test]
    fn test_worker_ranks_excludes_coordinator() {
        assert_eq!(workers(1).worker_ranks().count(), 0);
        assert_eq!(workers(4).worker_ranks().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_bucket_bounds() {
        let w = workers(4);
        assert_eq!(w.bucket_width(), 0.25);
        assert_eq!(w.bounds(0), (0.0, 0.25));
        assert_eq!(w.bounds(3), (0.75, 1.0));
    }

    #[test]
    fn test_partition_two_buckets() {
        let buckets = Buckets::partition(&[0.2, 0.7, 0.4, 0.9], workers(2));

        assert_eq!(buckets.get(0).unwrap(), &[0.2, 0.4]);
        assert_eq!(buckets.get(1).unwrap(), &[0.7, 0.9]);
        assert_eq!(buckets.sizes(), vec![2, 2]);
        assert_eq!(buckets.dropped(), 0);
    }

    #[test]
    fn test_partition_single_bucket_takes_everything() {
        let buckets = Buckets::partition(&[0.5, 0.1, 0.9, 1.0], workers(1));
        assert_eq!(buckets.get(0).unwrap(), &[0.5, 0.1, 0.9, 1.0]);
        assert_eq!(buckets.dropped(), 0);
    }

    #[test]
    fn test_partition_drops_zero() {
        let buckets = Buckets::partition(&[0.0, 0.3, 0.8], workers(2));
        assert_eq!(buckets.sizes(), vec![1, 1]);
        assert_eq!(buckets.dropped(), 1);
    }

    #[test]
    fn test_partition_drops_out_of_range() {
        let buckets = Buckets::partition(&[-0.1, 1.5, 0.5], workers(2));
        assert_eq!(buckets.sizes(), vec![1, 0]);
        assert_eq!(buckets.dropped(), 2);
    }

    #[test]
    fn test_interior_boundary_goes_low() {
        // 0.5 satisfies 0.0 < v <= 0.5 but not 0.5 < v
        assert_eq!(bucket_index(0.5, workers(2)), Some(0));
        assert_eq!(bucket_index(0.25, workers(4)), Some(0));
        assert_eq!(bucket_index(0.75, workers(4)), Some(2));
    }

    #[test]
    fn test_partition_ranges_hold() {
        let w = workers(7);
        let dataset: Vec<f32> = (1..1000).map(|i| i as f32 / 1000.0).collect();
        let buckets = Buckets::partition(&dataset, w);

        for i in 0..w.get() {
            let (low, high) = w.bounds(i);
            for &v in buckets.get(i).unwrap() {
                assert!(v > low && v <= high, "{} not in ({}, {}]", v, low, high);
            }
        }
        assert_eq!(buckets.sizes().iter().sum::<usize>(), dataset.len());
    }

    #[test]
    fn test_empty_bucket_kept() {
        let buckets = Buckets::partition(&[0.1, 0.2], workers(3));
        assert_eq!(buckets.sizes(), vec![2, 0, 0]);
        assert_eq!(buckets.into_inner().len(), 3);
    }

    #[test]
    fn test_concatenate_rank_order() {
        let sorted = concatenate(vec![vec![0.1, 0.2], vec![], vec![0.7, 0.9]]);
        assert_eq!(sorted, vec![0.1, 0.2, 0.7, 0.9]);
    }
}
