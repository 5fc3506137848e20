//! RAWBENCH - raw storage I/O benchmark
//!
//! Writes a large random payload with caching disabled, then measures
//! sequential, random and gapped reads against it while bypassing the
//! OS page cache.

use std::fmt;

pub mod bench;
pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod util;

/// The I/O operation that failed, used to label [`BenchError::Io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    /// Opening the target file
    Open,
    /// Writing the payload
    Write,
    /// Positioning the file cursor
    Seek,
    /// Reading from the target file
    Read,
    /// Deleting the target file
    Remove,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IoOp::Open => "could not open data file",
            IoOp::Write => "could not write random data file",
            IoOp::Seek => "seek error",
            IoOp::Read => "read error",
            IoOp::Remove => "could not remove data file",
        };
        f.write_str(label)
    }
}

// Common error types
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The target file is in the wrong state for the selected mode
    #[error("Precondition failed: {0}")]
    Precondition(String),
    /// A device-level operation failed or transferred fewer bytes than asked
    #[error("{op} at offset {offset}: {source}")]
    Io {
        op: IoOp,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
    /// An I/O buffer could not be allocated
    #[error("Buffer allocation failed: {0}")]
    Allocation(#[source] std::io::Error),
    /// Benchmark parameters are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BenchError {
    pub fn io(op: IoOp, offset: u64, source: std::io::Error) -> Self {
        BenchError::Io { op, offset, source }
    }

    /// Build the error reported when a transfer moved fewer bytes than requested.
    pub fn short_transfer(op: IoOp, offset: u64, expected: usize, actual: usize) -> Self {
        BenchError::Io {
            op,
            offset,
            source: std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("transferred {} of {} bytes", actual, expected),
            ),
        }
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, BenchError::Precondition(_))
    }

    /// Offset of the failing operation, if this is an I/O error.
    pub fn offset(&self) -> Option<u64> {
        match self {
            BenchError::Io { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Process exit status for this error. Every failure maps to the
    /// conventional `-1` of the reference tool.
    pub fn exit_code(&self) -> u8 {
        255
    }
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

// Common types and constants
pub const APP_NAME: &str = "rawbench";
pub const TARGET_FILE_NAME: &str = "osrm.tst";
pub const USAGE_EXIT_CODE: u8 = 255;
