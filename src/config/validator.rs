//! Configuration validation
//!
//! Usage errors are detected here, before any rank starts. Every process
//! validates its own arguments the same way, so no rank enters the protocol
//! with a configuration another rank would have rejected.

use super::{default_display_limit, default_workers, FileConfig, SortConfig};
use crate::bucket::WorkerCount;
use thiserror::Error;

/// Invalid command line or configuration file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Need one argument (= the list size n).")]
    MissingSize,

    #[error("List size must be >0 (got {0}).")]
    NonPositiveSize(i64),

    #[error("List size {0} does not fit in memory addressing on this platform.")]
    SizeTooLarge(i64),

    #[error("Worker count must be at least 1.")]
    NoWorkers,

    #[error("Coordinator mode needs at least one worker address in --host-list.")]
    NoHosts,
}

/// Validate the list size
pub fn validate_size(size: Option<i64>) -> Result<usize, UsageError> {
    let size = size.ok_or(UsageError::MissingSize)?;
    if size <= 0 {
        return Err(UsageError::NonPositiveSize(size));
    }
    usize::try_from(size).map_err(|_| UsageError::SizeTooLarge(size))
}

/// Validate the worker count
pub fn validate_workers(workers: Option<usize>) -> Result<WorkerCount, UsageError> {
    let workers = workers.unwrap_or_else(default_workers);
    WorkerCount::new(workers).ok_or(UsageError::NoWorkers)
}

/// Turn merged settings into a complete configuration
pub fn validate_config(file: FileConfig) -> Result<SortConfig, UsageError> {
    let size = validate_size(file.size)?;
    let workers = validate_workers(file.workers)?;

    Ok(SortConfig {
        size,
        workers,
        seed: file.seed,
        display_limit: file.display_limit.unwrap_or_else(default_display_limit),
        verify: file.verify.unwrap_or(false),
        json_output: file.json_output,
    })
}
