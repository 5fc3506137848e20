//! Benchmark configuration
//!
//! Holds the fixed parameters of the benchmark. The defaults are the
//! reference constants; the builder methods exist so tests can run the
//! same phases against a much smaller payload.

use crate::{BenchError, Result, TARGET_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of `u32` elements in the reference payload (1 GiB).
pub const DEFAULT_ELEMENT_COUNT: u64 = 268_435_456;
/// Addressing granularity for random and gapped reads.
pub const DEFAULT_BLOCK_SIZE: u64 = 512;
/// Bytes transferred by each random read (8 consecutive blocks).
pub const DEFAULT_RANDOM_READ_SIZE: u64 = 4096;
pub const DEFAULT_RANDOM_ITERATIONS: usize = 1000;
/// One block is sampled out of every stride during the gapped sweep.
pub const DEFAULT_GAP_STRIDE_BLOCKS: u64 = 1024;
/// Bytes at the end of the file that random reads never start in.
pub const DEFAULT_TAIL_RESERVE: u64 = 4096;
pub const DEFAULT_BUFFER_ALIGNMENT: usize = 4096;

/// Benchmark configuration structure containing all test parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of `u32` elements in the payload
    pub element_count: u64,
    /// Block size used to address random and gapped reads (in bytes)
    pub block_size: u64,
    /// Size of each random read (in bytes)
    pub random_read_size: u64,
    /// Number of random reads to perform
    pub random_iterations: usize,
    /// Distance between two gapped reads, in blocks
    pub gap_stride_blocks: u64,
    /// Reserved tail excluded from the random block range (in bytes)
    pub tail_reserve: u64,
    /// Memory alignment for I/O buffers
    pub buffer_alignment: usize,
    /// Name of the target file inside the benchmark directory
    pub file_name: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_ELEMENT_COUNT,
            block_size: DEFAULT_BLOCK_SIZE,
            random_read_size: DEFAULT_RANDOM_READ_SIZE,
            random_iterations: DEFAULT_RANDOM_ITERATIONS,
            gap_stride_blocks: DEFAULT_GAP_STRIDE_BLOCKS,
            tail_reserve: DEFAULT_TAIL_RESERVE,
            buffer_alignment: DEFAULT_BUFFER_ALIGNMENT,
            file_name: TARGET_FILE_NAME.to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// Create a new benchmark configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Total payload size in bytes
    pub fn payload_bytes(&self) -> u64 {
        self.element_count * std::mem::size_of::<u32>() as u64
    }

    /// Number of blocks a random read may start at without running past EOF
    pub fn block_count(&self) -> u64 {
        self.payload_bytes().saturating_sub(self.tail_reserve) / self.block_size
    }

    /// Number of samples the gapped sweep will collect
    pub fn gapped_sample_count(&self) -> u64 {
        self.block_count().div_ceil(self.gap_stride_blocks)
    }

    /// Resolve the target file inside `dir`
    pub fn target_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.element_count == 0 {
            return Err(BenchError::Config(
                "Element count must be greater than 0".to_string(),
            ));
        }

        if self.block_size == 0 || !self.block_size.is_power_of_two() {
            return Err(BenchError::Config(format!(
                "Block size must be a non-zero power of 2, got {}",
                self.block_size
            )));
        }

        // Uncached transfers must cover whole blocks
        if self.payload_bytes() % self.block_size != 0 {
            return Err(BenchError::Config(format!(
                "Payload size {} is not a multiple of the block size {}",
                self.payload_bytes(),
                self.block_size
            )));
        }

        if self.random_read_size == 0 || self.random_read_size % self.block_size != 0 {
            return Err(BenchError::Config(format!(
                "Random read size {} must be a non-zero multiple of the block size {}",
                self.random_read_size, self.block_size
            )));
        }

        if self.tail_reserve < self.random_read_size {
            return Err(BenchError::Config(format!(
                "Tail reserve {} is smaller than the random read size {}",
                self.tail_reserve, self.random_read_size
            )));
        }

        if self.block_count() == 0 {
            return Err(BenchError::Config(format!(
                "Payload of {} bytes leaves no addressable blocks past the {} byte tail reserve",
                self.payload_bytes(),
                self.tail_reserve
            )));
        }

        if self.random_iterations == 0 {
            return Err(BenchError::Config(
                "Random iteration count must be greater than 0".to_string(),
            ));
        }

        if self.gap_stride_blocks == 0 {
            return Err(BenchError::Config(
                "Gap stride must be greater than 0".to_string(),
            ));
        }

        if !self.buffer_alignment.is_power_of_two() {
            return Err(BenchError::Config(format!(
                "Buffer alignment must be a power of 2, got {}",
                self.buffer_alignment
            )));
        }

        if self.file_name.is_empty() {
            return Err(BenchError::Config("File name must not be empty".to_string()));
        }

        Ok(())
    }

    /// Set the payload size in `u32` elements
    pub fn with_element_count(mut self, count: u64) -> Self {
        self.element_count = count;
        self
    }

    /// Set the number of random reads
    pub fn with_random_iterations(mut self, iterations: usize) -> Self {
        self.random_iterations = iterations;
        self
    }

    /// Set the gapped sweep stride
    pub fn with_gap_stride_blocks(mut self, stride: u64) -> Self {
        self.gap_stride_blocks = stride;
        self
    }

    /// Set the target file name
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }
}
