//! Dataset generation
//!
//! The coordinator rank fills the unsorted dataset from a [`ValueSource`].
//! The bucket layout assumes every generated value lies in `[0, 1)`, so a
//! source must never produce anything outside that interval.
//!
//! # Example
//!
//! ```
//! use bucketsort::distribution::{ValueSource, uniform::UniformSource};
//!
//! let mut source = UniformSource::with_seed(42);
//! let dataset = source.generate(1000);
//! assert_eq!(dataset.len(), 1000);
//! assert!(dataset.iter().all(|&v| (0.0..1.0).contains(&v)));
//! ```

/// Source of unsorted dataset values
///
/// # Thread Safety
///
/// Sources must be `Send` so a coordinator can be built on one thread and
/// run on another.
pub trait ValueSource: Send {
    /// Produce the next value in `[0, 1)`
    fn next_value(&mut self) -> f32;

    /// Produce a dataset of `n` values
    fn generate(&mut self, n: usize) -> Vec<f32> {
        (0..n).map(|_| self.next_value()).collect()
    }
}

pub mod uniform;

/// Fixed list of values, replayed in order and then cycled
///
/// Useful when the dataset is already known (tests, reproducing a run).
pub struct ReplaySource {
    values: Vec<f32>,
    pos: usize,
}

impl ReplaySource {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, pos: 0 }
    }
}

impl ValueSource for ReplaySource {
    fn next_value(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
