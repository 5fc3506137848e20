//! Benchmark result data models
//!
//! Reports produced by the two benchmark phases. They are printed once
//! and never stored.

use crate::models::stats::Statistics;
use crate::util::units::calculate_throughput_mbps;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One timed bulk transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSample {
    /// Bytes transferred by the timed call
    pub bytes: u64,
    /// Wall-clock duration of the call in seconds
    pub elapsed_secs: f64,
    /// Throughput in MiB per second
    pub throughput_mbps: f64,
}

impl ThroughputSample {
    pub fn new(bytes: u64, elapsed_secs: f64) -> Self {
        Self {
            bytes,
            elapsed_secs,
            throughput_mbps: calculate_throughput_mbps(bytes, elapsed_secs),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_secs * 1000.0
    }
}

/// Latency samples for one read pattern and their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyReport {
    /// Per-operation latencies in seconds, in the order they were taken
    pub samples: Vec<f64>,
    /// Summary over `samples`
    pub statistics: Statistics,
}

impl LatencyReport {
    /// Summarize `samples`; `None` if nothing was measured
    pub fn from_samples(samples: Vec<f64>) -> Option<Self> {
        let statistics = Statistics::from_samples(&samples)?;
        Some(Self {
            samples,
            statistics,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Outcome of the payload generation phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteReport {
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
    /// Whether the write bypassed the page cache
    pub direct: bool,
    pub write: ThroughputSample,
}

/// Outcome of the read benchmark phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadReport {
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
    /// Whether the reads bypassed the page cache
    pub direct: bool,
    /// The single full-file read
    pub sequential: ThroughputSample,
    /// Random 4 KiB reads
    pub random: LatencyReport,
    /// One block read per stride across the whole file
    pub gapped: LatencyReport,
}

impl ReadReport {
    /// One-line summary for the end of a run
    pub fn summary(&self) -> String {
        let random = self.random.statistics.to_millis();
        let gapped = self.gapped.statistics.to_millis();
        format!(
            "{} - seq {:.2} MB/s - random {:.3}ms mean ({} ops) - gapped {:.3}ms mean ({} ops)",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.sequential.throughput_mbps,
            random.mean,
            self.random.sample_count(),
            gapped.mean,
            self.gapped.sample_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_read_report() -> ReadReport {
        ReadReport {
            timestamp: Utc::now(),
            path: PathBuf::from("/tmp/osrm.tst"),
            direct: true,
            sequential: ThroughputSample::new(1024 * 1024 * 1024, 2.0),
            random: LatencyReport::from_samples(vec![0.001, 0.002, 0.003]).unwrap(),
            gapped: LatencyReport::from_samples(vec![0.0005, 0.0007]).unwrap(),
        }
    }

    #[test]
    fn test_throughput_sample_uses_mib() {
        let sample = ThroughputSample::new(1024 * 1024 * 1024, 2.0);
        assert!((sample.throughput_mbps - 512.0).abs() < 1e-9);
        assert!((sample.elapsed_ms() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_latency_report_empty() {
        assert!(LatencyReport::from_samples(Vec::new()).is_none());
    }

    #[test]
    fn test_latency_report_keeps_sample_order() {
        let report = LatencyReport::from_samples(vec![0.003, 0.001, 0.002]).unwrap();
        assert_eq!(report.samples, vec![0.003, 0.001, 0.002]);
        assert_eq!(report.statistics.min, 0.001);
        assert_eq!(report.sample_count(), 3);
    }

    #[test]
    fn test_read_report_summary() {
        let summary = create_test_read_report().summary();
        assert!(summary.contains("512.00 MB/s"));
        assert!(summary.contains("(3 ops)"));
        assert!(summary.contains("(2 ops)"));
    }

    #[test]
    fn test_serde_serialization() {
        let report = create_test_read_report();
        let json = serde_json::to_string(&report).expect("Failed to serialize to JSON");
        let deserialized: ReadReport =
            serde_json::from_str(&json).expect("Failed to deserialize from JSON");

        assert_eq!(report.timestamp, deserialized.timestamp);
        assert_eq!(report.path, deserialized.path);
        assert_eq!(report.random.sample_count(), deserialized.random.sample_count());
        assert!((report.gapped.statistics.mean - deserialized.gapped.statistics.mean).abs() < 1e-12);
    }
}
