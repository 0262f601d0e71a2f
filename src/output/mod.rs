//! Result output
//!
//! - `text`: console reporting of lists, buckets and timing
//! - `json`: machine-readable run summary

pub mod json;
pub mod text;
