//! Units formatting and conversion utilities
//!
//! Throughput is reported in "MB/s" where one MB is 1 MiB (1,048,576
//! bytes), matching the reference tool's output.

/// Bytes in one MiB
pub const MIB: f64 = 1_048_576.0;

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use rawbench::util::units::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// assert_eq!(format_bytes(1073741824), "1.0 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate throughput in MB/s from bytes and elapsed seconds
///
/// # Examples
/// ```
/// use rawbench::util::units::calculate_throughput_mbps;
///
/// let throughput = calculate_throughput_mbps(1048576, 1.0);
/// assert!((throughput - 1.0).abs() < 0.01);
/// ```
pub fn calculate_throughput_mbps(bytes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }

    bytes as f64 / MIB / elapsed_secs
}

/// Format a duration given in seconds as milliseconds with five decimals
///
/// # Examples
/// ```
/// use rawbench::util::units::format_millis;
///
/// assert_eq!(format_millis(0.0015), "1.50000ms");
/// ```
pub fn format_millis(secs: f64) -> String {
    format!("{:.5}ms", secs * 1000.0)
}
