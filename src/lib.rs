//! bucketsort - Distributed bucket sort
//!
//! Sorts a list of floats in `[0, 1)` across a fixed group of ranks. Rank 0
//! partitions the list into one numeric range per rank, every rank quicksorts
//! its own range, and rank 0 concatenates the sorted ranges in rank order.
//!
//! # Architecture
//!
//! - **Local sort**: in-place quicksort with a first-element pivot
//! - **Bucket protocol**: coordinator and worker state machines over abstract channels
//! - **Transports**: rendezvous channels between threads, or TCP between processes
//! - **Ambient**: TOML/CLI configuration, console and JSON reporting, result verification

pub mod bucket;
pub mod config;
pub mod coordinator;
pub mod distributed;
pub mod distribution;
pub mod output;
pub mod sort;
pub mod util;

// Re-export commonly used types
pub use bucket::{BucketCoordinator, BucketWorker, SortOutcome, WorkerCount};
pub use config::SortConfig;

/// Result type used throughout bucketsort
pub type Result<T> = anyhow::Result<T>;
