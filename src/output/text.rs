//! Human-readable console output

use crate::bucket::{Rank, WorkerCount};
use crate::util::time::format_duration;
use std::time::Duration;

/// Printed instead of a list longer than the display limit
pub const LIST_TOO_LARGE: &str = "Not displaying 'full list' - n too large.";

/// Format a list of values for the console
///
/// Each value is preceded by a space. Lists longer than `display_limit` are
/// replaced by [`LIST_TOO_LARGE`].
pub fn format_list(values: &[f32], display_limit: usize) -> String {
    if values.len() > display_limit {
        return LIST_TOO_LARGE.to_string();
    }

    let mut out = String::with_capacity(values.len() * 10);
    for v in values {
        out.push(' ');
        out.push_str(&v.to_string());
    }
    out
}

/// Print the run banner
pub fn print_header(workers: WorkerCount, size: usize) {
    println!();
    println!("N Procs = {}  Array size = {}", workers, size);
    println!();
}

/// Print a labelled list
pub fn print_list(label: &str, values: &[f32], display_limit: usize) {
    println!("{}{}", label, format_list(values, display_limit));
}

/// Print the bucket a worker received
pub fn print_received_bucket(rank: Rank, size: u64, values: &[f32], display_limit: usize) {
    println!(
        "Process {}:  bucket size {}.  Elements:{}",
        rank,
        size,
        format_list(values, display_limit)
    );
}

/// Print the bucket a worker sorted
pub fn print_sorted_bucket(rank: Rank, values: &[f32], display_limit: usize) {
    println!("Process {}:  Sorted Elements:{}", rank, format_list(values, display_limit));
}

/// Print the total wall-clock time of the run
pub fn print_total_time(elapsed: Duration) {
    println!(
        "Total time: {:.6} secs ({})",
        elapsed.as_secs_f64(),
        format_duration(elapsed)
    );
}

/// Print the number of values that fell into no bucket
pub fn print_dropped(dropped: usize) {
    if dropped > 0 {
        println!("Dropped {} value(s) outside every bucket range", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_list_small() {
        assert_eq!(format_list(&[0.1, 0.5, 0.9], 100), " 0.1 0.5 0.9");
    }

    #[test]
    fn test_format_list_empty() {
        assert_eq!(format_list(&[], 100), "");
    }

    #[test]
    fn test_format_list_at_limit() {
        let values = vec![0.5f32; 3];
        assert_eq!(format_list(&values, 3), " 0.5 0.5 0.5");
        assert_eq!(format_list(&values, 2), LIST_TOO_LARGE);
    }
}
