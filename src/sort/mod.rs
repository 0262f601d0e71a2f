//! Local in-place sorting
//!
//! Every rank sorts its own bucket with a plain partition-exchange quicksort.
//! The pivot is always the first element of the range being sorted. There is
//! no randomization and no median-of-three, so already-sorted input degrades
//! to O(n^2) comparisons. Buckets are expected to be small and roughly
//! uniform, so this is accepted.
//!
//! # Example
//!
//! ```
//! use bucketsort::sort::quicksort;
//!
//! let mut bucket = vec![0.7f32, 0.2, 0.9, 0.4];
//! let len = bucket.len();
//! quicksort(&mut bucket, 0, len);
//! assert_eq!(bucket, vec![0.2, 0.4, 0.7, 0.9]);
//! ```
//!
//! The sort is not stable. Equal values may be reordered relative to each
//! other; only the ascending order of the values is guaranteed.

/// Sort the half-open range `[start, end)` of `list` in place, ascending.
///
/// Ranges of length 0 or 1 are left untouched. `start` and `end` must lie
/// within the slice; out-of-range bounds panic on indexing.
///
/// Each partition step splits the range around its first element. The
/// smaller side is sorted by recursion and the larger side by looping, which
/// performs the same partition steps as naive two-sided recursion while
/// bounding the stack depth to O(log n).
pub fn quicksort(list: &mut [f32], start: usize, end: usize) {
    let (mut start, mut end) = (start, end);

    while end > start + 1 {
        let pivot = partition(list, start, end, start);

        // [start, pivot) holds values <= pivot; [pivot + 1, end) holds the rest
        if pivot - start < end - (pivot + 1) {
            quicksort(list, start, pivot);
            start = pivot + 1;
        } else {
            quicksort(list, pivot + 1, end);
            end = pivot;
        }
    }
}

/// Partition `[start, end)` around the value at `pivot_index`.
///
/// The pivot is parked at `end - 1`, every element `<= pivot` is swapped
/// down to the store index in a single left-to-right scan, and the pivot is
/// finally swapped into the store index, which is returned.
///
/// On return, every element before the returned index is `<= pivot`, every
/// element after it is `> pivot`, and the element at it is the pivot itself.
pub fn partition(list: &mut [f32], start: usize, end: usize, pivot_index: usize) -> usize {
    let pivot_value = list[pivot_index];
    list.swap(pivot_index, end - 1);

    let mut store_index = start;
    for i in start..end - 1 {
        if list[i] <= pivot_value {
            list.swap(i, store_index);
            store_index += 1;
        }
    }

    list.swap(store_index, end - 1);
    store_index
}

/// Sort an entire bucket.
#[inline]
pub fn sort_bucket(bucket: &mut [f32]) {
    let len = bucket.len();
    quicksort(bucket, 0, len);
}
