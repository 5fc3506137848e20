//! Utility functions module
//!
//! Contains helpers for unit conversion and formatting of sizes,
//! throughput and latencies.

pub mod units;

// Re-export commonly used functions
pub use units::{calculate_throughput_mbps, format_bytes, format_millis};
