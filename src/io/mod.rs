//! I/O operations module
//!
//! Contains the cache-bypassing file abstraction, one implementation per
//! platform, and the aligned buffers uncached transfers require.

pub mod buffer;
pub mod disk;

pub use buffer::AlignedBuffer;
pub use disk::{create_disk_io, DirectFile, OpenMode, PlatformDiskIO, TargetFile, UncachedIo};
