//! Payload generation phase
//!
//! Fills a 1 GiB buffer with random integers and writes it to the target
//! file in a single synchronous, cache-bypassing write.

use crate::bench::payload::Payload;
use crate::config::BenchmarkConfig;
use crate::io::disk::{OpenMode, PlatformDiskIO, UncachedIo};
use crate::models::{ThroughputSample, WriteReport};
use crate::util::units::format_bytes;
use crate::{BenchError, IoOp, Result};
use chrono::Utc;
use rand::{rngs::SmallRng, SeedableRng};
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Generator phase executor
pub struct PayloadGenerator<D = PlatformDiskIO> {
    config: BenchmarkConfig,
    disk_io: D,
}

impl PayloadGenerator<PlatformDiskIO> {
    /// Create a generator that writes through the platform's uncached I/O
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        Self::with_disk_io(config, PlatformDiskIO::new())
    }
}

impl<D: UncachedIo> PayloadGenerator<D> {
    pub fn with_disk_io(config: BenchmarkConfig, disk_io: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, disk_io })
    }

    /// Write the payload to `<dir>/<file_name>`. The file is left in place
    /// for a later benchmark run; nothing is cleaned up on failure.
    pub fn run(&self, dir: &Path) -> Result<WriteReport> {
        let path = self.config.target_path(dir);
        if path.exists() {
            return Err(BenchError::Precondition("data file already exists".to_string()));
        }

        let mut rng = SmallRng::from_entropy();
        let payload = Payload::random(
            self.config.element_count,
            self.config.buffer_alignment,
            &mut rng,
        )?;
        debug!(
            elements = payload.element_count(),
            "generated {} of random data",
            format_bytes(payload.len() as u64)
        );

        let mut file = self
            .disk_io
            .open_uncached(&path, OpenMode::CreateNew)
            .map_err(|err| match err.kind() {
                // Lost a race with another writer
                io::ErrorKind::AlreadyExists => {
                    BenchError::Precondition("data file already exists".to_string())
                }
                _ => BenchError::io(IoOp::Open, 0, err),
            })?;
        let direct = file.is_direct();

        let start = Instant::now();
        let written = file.write_sync(payload.as_bytes());
        let elapsed = start.elapsed().as_secs_f64();

        let written = written.map_err(|err| BenchError::io(IoOp::Write, 0, err))?;
        if written != payload.len() {
            return Err(BenchError::short_transfer(
                IoOp::Write,
                0,
                payload.len(),
                written,
            ));
        }
        drop(file);

        let write = ThroughputSample::new(written as u64, elapsed);
        debug!(
            "writing raw {} took {:.3}ms",
            format_bytes(write.bytes),
            write.elapsed_ms()
        );
        info!(
            bytes = write.bytes,
            direct,
            "raw write performance: {:.5}MB/sec",
            write.throughput_mbps
        );
        debug!("finished creation of random data. Flush disk cache now!");

        Ok(WriteReport {
            timestamp: Utc::now(),
            path,
            direct,
            write,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::disk::DirectFile;
    use tempfile::tempdir;

    /// Buffered platform I/O whose writes stop halfway through the buffer
    struct HalfWriteDiskIO;

    struct HalfWriteFile(Box<dyn DirectFile>);

    impl UncachedIo for HalfWriteDiskIO {
        fn open_uncached(&self, path: &Path, mode: OpenMode) -> io::Result<Box<dyn DirectFile>> {
            let inner = PlatformDiskIO::buffered().open_uncached(path, mode)?;
            Ok(Box::new(HalfWriteFile(inner)))
        }
    }

    impl DirectFile for HalfWriteFile {
        fn write_sync(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write_sync(&buf[..buf.len() / 2])
        }

        fn read_aligned(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read_aligned(buf)
        }

        fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
            self.0.seek_to(offset)
        }

        fn is_direct(&self) -> bool {
            false
        }
    }

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig::new().with_element_count(262_144)
    }

    #[test]
    fn test_generate_writes_full_payload() {
        let temp_dir = tempdir().unwrap();
        let generator =
            PayloadGenerator::with_disk_io(small_config(), PlatformDiskIO::buffered()).unwrap();

        let report = generator.run(temp_dir.path()).unwrap();
        assert_eq!(report.path, temp_dir.path().join("osrm.tst"));
        assert_eq!(report.write.bytes, 262_144 * 4);
        assert!(report.write.elapsed_secs > 0.0);
        assert!(report.write.throughput_mbps > 0.0);

        let len = std::fs::metadata(&report.path).unwrap().len();
        assert_eq!(len, 262_144 * 4);
    }

    #[test]
    fn test_generate_twice_fails_without_overwriting() {
        let temp_dir = tempdir().unwrap();
        let generator =
            PayloadGenerator::with_disk_io(small_config(), PlatformDiskIO::buffered()).unwrap();

        let report = generator.run(temp_dir.path()).unwrap();
        let original = std::fs::read(&report.path).unwrap();

        let err = generator.run(temp_dir.path()).unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("data file already exists"));

        let after = std::fs::read(&report.path).unwrap();
        assert_eq!(original, after);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BenchmarkConfig::new().with_element_count(100);
        assert!(matches!(
            PayloadGenerator::with_disk_io(config, PlatformDiskIO::buffered()),
            Err(BenchError::Config(_))
        ));
    }

    #[test]
    fn test_short_write_is_write_error() {
        let temp_dir = tempdir().unwrap();
        let generator = PayloadGenerator::with_disk_io(small_config(), HalfWriteDiskIO).unwrap();

        let err = generator.run(temp_dir.path()).unwrap_err();
        assert!(matches!(err, BenchError::Io { op: IoOp::Write, offset: 0, .. }));
        assert_eq!(
            err.to_string(),
            "could not write random data file at offset 0: transferred 524288 of 1048576 bytes"
        );
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let generator =
            PayloadGenerator::with_disk_io(small_config(), PlatformDiskIO::buffered()).unwrap();

        let err = generator.run(&temp_dir.path().join("no-such-dir")).unwrap_err();
        assert!(matches!(err, BenchError::Io { op: IoOp::Open, .. }));
    }
}
