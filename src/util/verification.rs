//! Result verification
//!
//! Checks a finished sort: the output must be non-decreasing, and it must hold
//! exactly the input values that fell into some bucket. Values dropped by the
//! bucket range test are expected to be missing.

use crate::bucket::{bucket_index, WorkerCount};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    /// Output is sorted and holds the expected values
    Success,
    /// Output decreases between `index` and `index + 1`
    Unsorted {
        index: usize,
        left: f32,
        right: f32,
    },
    /// Output does not hold the expected values
    Mismatch {
        /// Number of input values that belong to a bucket
        expected: usize,
        /// Number of output values
        actual: usize,
        /// First position where the sorted expectation and the output differ
        first_difference: Option<usize>,
    },
}

impl VerificationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationResult::Success)
    }
}

/// Index of the first descent in `values`, if any
pub fn first_descent(values: &[f32]) -> Option<usize> {
    values.par_windows(2).position_first(|w| w[0] > w[1])
}

/// Verify `output` against the `input` it was produced from
pub fn verify_sort(input: &[f32], output: &[f32], workers: WorkerCount) -> VerificationResult {
    if let Some(index) = first_descent(output) {
        return VerificationResult::Unsorted {
            index,
            left: output[index],
            right: output[index + 1],
        };
    }

    let mut expected: Vec<f32> = input
        .par_iter()
        .copied()
        .filter(|&v| bucket_index(v, workers).is_some())
        .collect();
    expected.par_sort_unstable_by(|a, b| a.total_cmp(b));

    if expected.len() != output.len() {
        return VerificationResult::Mismatch {
            expected: expected.len(),
            actual: output.len(),
            first_difference: None,
        };
    }

    match expected.iter().zip(output).position(|(e, o)| e != o) {
        None => VerificationResult::Success,
        Some(i) => VerificationResult::Mismatch {
            expected: expected.len(),
            actual: output.len(),
            first_difference: Some(i),
        },
    }
}
