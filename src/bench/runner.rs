//! Uncached read benchmark phase
//!
//! Reads the file written by the generator with the page cache bypassed:
//! one full sequential read, then random 4 KiB reads, then a gapped sweep
//! that touches one block per stride. The target file is removed when the
//! run ends, whether it succeeded or not.

use crate::config::BenchmarkConfig;
use crate::io::buffer::AlignedBuffer;
use crate::io::disk::{DirectFile, OpenMode, PlatformDiskIO, TargetFile, UncachedIo};
use crate::models::{LatencyReport, ReadReport, Statistics, ThroughputSample};
use crate::util::units::{format_bytes, format_millis};
use crate::{BenchError, IoOp, Result};
use chrono::Utc;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Read benchmark executor
pub struct BenchmarkRunner<D = PlatformDiskIO> {
    config: BenchmarkConfig,
    disk_io: D,
}

impl BenchmarkRunner<PlatformDiskIO> {
    /// Create a runner that reads through the platform's uncached I/O
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        Self::with_disk_io(config, PlatformDiskIO::new())
    }
}

impl<D: UncachedIo> BenchmarkRunner<D> {
    pub fn with_disk_io(config: BenchmarkConfig, disk_io: D) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, disk_io })
    }

    /// Run all read phases against `<dir>/<file_name>` and delete it
    pub fn run(&self, dir: &Path) -> Result<ReadReport> {
        let path = self.config.target_path(dir);
        if !path.exists() {
            return Err(BenchError::Precondition("data file does not exist".to_string()));
        }

        // Removes the file if any phase below fails
        let target = TargetFile::new(path);
        let report = self.measure(target.path())?;

        target
            .remove()
            .map_err(|err| BenchError::io(IoOp::Remove, 0, err))?;
        debug!("removing temporary files");

        Ok(report)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn DirectFile>> {
        self.disk_io
            .open_uncached(path, OpenMode::Read)
            .map_err(|err| BenchError::io(IoOp::Open, 0, err))
    }

    fn measure(&self, path: &Path) -> Result<ReadReport> {
        let sequential = self.sequential_read(path)?;

        // Fresh handle so the following phases start from a clean state
        let mut file = self.open(path)?;
        let direct = file.is_direct();

        let random = self.random_reads(file.as_mut())?;
        debug!("running raw random I/O statistics");
        log_statistics("raw random I/O", &random.statistics);

        let gapped = self.gapped_reads(file.as_mut())?;
        debug!("running gapped I/O statistics");
        log_statistics("raw gapped I/O", &gapped.statistics);

        Ok(ReadReport {
            timestamp: Utc::now(),
            path: path.to_path_buf(),
            direct,
            sequential,
            random,
            gapped,
        })
    }

    /// Time a single read of the whole file into one aligned buffer
    fn sequential_read(&self, path: &Path) -> Result<ThroughputSample> {
        let size = usize::try_from(self.config.payload_bytes()).map_err(|_| {
            BenchError::Config("Payload does not fit in memory on this platform".to_string())
        })?;
        let mut buffer = AlignedBuffer::new(size, self.config.buffer_alignment)
            .map_err(BenchError::Allocation)?;
        let mut file = self.open(path)?;

        let start = Instant::now();
        let read = file.read_aligned(&mut buffer);
        let elapsed = start.elapsed().as_secs_f64();

        let read = read.map_err(|err| {
            warn!(offset = 0, error = %err, "read error");
            BenchError::io(IoOp::Read, 0, err)
        })?;
        if read != size {
            return Err(BenchError::short_transfer(IoOp::Read, 0, size, read));
        }

        let sample = ThroughputSample::new(read as u64, elapsed);
        debug!(
            "reading raw {} took {:.3}ms",
            format_bytes(sample.bytes),
            sample.elapsed_ms()
        );
        info!(
            bytes = sample.bytes,
            "raw read performance: {:.5}MB/sec",
            sample.throughput_mbps
        );
        Ok(sample)
    }

    /// Read `random_read_size` bytes at uniformly chosen block offsets
    fn random_reads(&self, file: &mut dyn DirectFile) -> Result<LatencyReport> {
        let iterations = self.config.random_iterations;
        let read_size = usize::try_from(self.config.random_read_size)
            .map_err(|_| BenchError::Config("Random read size too large".to_string()))?;
        let block_count = self.config.block_count();

        debug!(
            "running {} random I/Os of {}",
            iterations,
            format_bytes(self.config.random_read_size)
        );
        seek_start(file)?;

        let mut chunk = AlignedBuffer::new(read_size, self.config.buffer_alignment)
            .map_err(BenchError::Allocation)?;
        let mut rng = SmallRng::from_entropy();
        let mut samples = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let block = rng.gen_range(0..block_count);
            let offset = block * self.config.block_size;
            samples.push(timed_read(file, offset, &mut chunk)?);
        }

        LatencyReport::from_samples(samples)
            .ok_or_else(|| BenchError::Config("no random reads were performed".to_string()))
    }

    /// Read one block out of every `gap_stride_blocks`, front to back
    fn gapped_reads(&self, file: &mut dyn DirectFile) -> Result<LatencyReport> {
        let block_count = self.config.block_count();
        let stride = usize::try_from(self.config.gap_stride_blocks)
            .map_err(|_| BenchError::Config("Gap stride too large".to_string()))?;
        let block_size = usize::try_from(self.config.block_size)
            .map_err(|_| BenchError::Config("Block size too large".to_string()))?;

        debug!(
            "running {} gapped I/Os of {}",
            self.config.gapped_sample_count(),
            format_bytes(self.config.block_size)
        );
        seek_start(file)?;

        let mut block = AlignedBuffer::new(block_size, self.config.buffer_alignment)
            .map_err(BenchError::Allocation)?;
        let mut samples = Vec::with_capacity(self.config.gapped_sample_count() as usize);
        for index in (0..block_count).step_by(stride) {
            let offset = index * self.config.block_size;
            samples.push(timed_read(file, offset, &mut block)?);
        }

        LatencyReport::from_samples(samples)
            .ok_or_else(|| BenchError::Config("no gapped reads were performed".to_string()))
    }
}

fn seek_start(file: &mut dyn DirectFile) -> Result<()> {
    file.seek_to(0).map_err(|err| {
        warn!(offset = 0, error = %err, "seek error");
        BenchError::io(IoOp::Seek, 0, err)
    })?;
    Ok(())
}

/// Seek to `offset` and fill `buf`, returning the elapsed seconds of the
/// seek and read together.
fn timed_read(file: &mut dyn DirectFile, offset: u64, buf: &mut [u8]) -> Result<f64> {
    let start = Instant::now();
    let seek = file.seek_to(offset);
    let read = match seek {
        Ok(_) => file.read_aligned(buf),
        Err(err) => {
            warn!(offset, error = %err, "seek error");
            return Err(BenchError::io(IoOp::Seek, offset, err));
        }
    };
    let elapsed = start.elapsed().as_secs_f64();

    match read {
        Ok(n) if n == buf.len() => Ok(elapsed),
        Ok(n) => {
            warn!(offset, read = n, expected = buf.len(), "read error: short read");
            Err(BenchError::short_transfer(IoOp::Read, offset, buf.len(), n))
        }
        Err(err) => {
            warn!(offset, error = %err, "read error");
            Err(BenchError::io(IoOp::Read, offset, err))
        }
    }
}

fn log_statistics(label: &str, stats: &Statistics) {
    info!("{}", statistics_line(label, stats));
}

fn statistics_line(label: &str, stats: &Statistics) -> String {
    format!(
        "{}: min: {}, mean: {}, med: {}, max: {}, dev: {}",
        label,
        format_millis(stats.min),
        format_millis(stats.mean),
        format_millis(stats.median),
        format_millis(stats.max),
        format_millis(stats.dev)
    )
}
