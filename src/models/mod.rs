//! Data models module
//!
//! Contains latency statistics and the reports produced by the
//! generator and benchmark phases.

pub mod result;
pub mod stats;

// Re-export commonly used types
pub use result::{LatencyReport, ReadReport, ThroughputSample, WriteReport};
pub use stats::Statistics;
