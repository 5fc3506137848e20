use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// How the target file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create a new file for writing; fails if it already exists
    CreateNew,
    /// Open an existing file read-only
    Read,
}

/// Capability to open files with the OS cache bypassed
pub trait UncachedIo {
    /// Open `path` with read-ahead and page caching disabled and, for
    /// writes, synchronous completion requested
    fn open_uncached(&self, path: &Path, mode: OpenMode) -> io::Result<Box<dyn DirectFile>>;
}

/// Handle operations for unbuffered I/O. Each call maps to exactly one
/// system call so that timings bracket a single device operation.
pub trait DirectFile: Send {
    /// Write `buf` and return once the data is durable
    fn write_sync(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Read into an aligned buffer
    fn read_aligned(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Seek to an absolute offset
    fn seek_to(&mut self, offset: u64) -> io::Result<u64>;

    /// Whether the page cache is actually bypassed for this handle
    fn is_direct(&self) -> bool;
}

/// Owner of the on-disk target path. Removes the file on drop unless it
/// was already removed explicitly, so a failed benchmark does not leave
/// 1 GiB behind.
#[derive(Debug)]
pub struct TargetFile {
    path: PathBuf,
    remove_on_drop: bool,
}

impl TargetFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            remove_on_drop: true,
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting failure instead of ignoring it
    pub fn remove(mut self) -> io::Result<()> {
        self.remove_on_drop = false;
        std::fs::remove_file(&self.path)
    }
}

impl Drop for TargetFile {
    fn drop(&mut self) {
        if self.remove_on_drop && self.path.exists() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => tracing::warn!(path = %self.path.display(), "removing temporary files"),
                Err(err) => tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not remove temporary file"
                ),
            }
        }
    }
}

/// Platform-specific disk I/O implementation
#[derive(Debug, Clone)]
pub struct PlatformDiskIO {
    direct: bool,
}

impl PlatformDiskIO {
    /// Handles that bypass the page cache where the filesystem allows it
    pub fn new() -> Self {
        Self { direct: true }
    }

    /// Handles that keep synchronous writes but go through the page cache
    pub fn buffered() -> Self {
        Self { direct: false }
    }
}

impl Default for PlatformDiskIO {
    fn default() -> Self {
        Self::new()
    }
}

/// `std::fs::File` behind the [`DirectFile`] interface
pub struct PlatformFile {
    file: File,
    direct: bool,
}

impl PlatformFile {
    pub fn new(file: File, direct: bool) -> Self {
        Self { file, direct }
    }
}

impl DirectFile for PlatformFile {
    fn write_sync(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn read_aligned(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(offset))
    }

    fn is_direct(&self) -> bool {
        self.direct
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_FLAG_WRITE_THROUGH: u32 = 0x80000000;
    const FILE_FLAG_NO_BUFFERING: u32 = 0x20000000;

    impl UncachedIo for PlatformDiskIO {
        fn open_uncached(&self, path: &Path, mode: OpenMode) -> io::Result<Box<dyn DirectFile>> {
            let no_buffering = if self.direct { FILE_FLAG_NO_BUFFERING } else { 0 };
            let mut options = OpenOptions::new();
            match mode {
                OpenMode::CreateNew => {
                    options
                        .write(true)
                        .create_new(true)
                        .custom_flags(FILE_FLAG_WRITE_THROUGH | no_buffering);
                }
                OpenMode::Read => {
                    options.read(true).custom_flags(no_buffering);
                }
            }
            let file = options.open(path)?;
            Ok(Box::new(PlatformFile::new(file, self.direct)))
        }
    }
}

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;

    /// Linux: switch the descriptor to O_DIRECT. Filesystems without
    /// direct I/O support (tmpfs and friends) reject this with EINVAL.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn bypass_cache(file: &File) -> io::Result<()> {
        let fd = file.as_raw_fd();
        // SAFETY: fd is a valid open descriptor owned by `file`.
        unsafe {
            let flags = libc::fcntl(fd, libc::F_GETFL);
            if flags == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_DIRECT) == -1 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    /// macOS: F_NOCACHE turns off the unified buffer cache for this
    /// descriptor, F_RDAHEAD 0 turns off read-ahead.
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    fn bypass_cache(file: &File) -> io::Result<()> {
        let fd = file.as_raw_fd();
        // SAFETY: fd is a valid open descriptor owned by `file`.
        unsafe {
            if libc::fcntl(fd, libc::F_NOCACHE, 1) == -1 {
                return Err(io::Error::last_os_error());
            }
            if libc::fcntl(fd, libc::F_RDAHEAD, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios"
    )))]
    fn bypass_cache(_file: &File) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no cache bypass available on this platform",
        ))
    }

    /// Ask the kernel not to read ahead on a buffered descriptor.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn disable_readahead(file: &File) {
        // SAFETY: fd is a valid open descriptor owned by `file`.
        let ret = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_RANDOM) };
        if ret != 0 {
            tracing::debug!(error = %io::Error::from_raw_os_error(ret), "posix_fadvise failed");
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn disable_readahead(_file: &File) {}

    impl UncachedIo for PlatformDiskIO {
        fn open_uncached(&self, path: &Path, mode: OpenMode) -> io::Result<Box<dyn DirectFile>> {
            let mut options = OpenOptions::new();
            match mode {
                OpenMode::CreateNew => {
                    options
                        .write(true)
                        .create_new(true)
                        .mode(0o700)
                        .custom_flags(libc::O_SYNC);
                }
                OpenMode::Read => {
                    options.read(true).custom_flags(libc::O_SYNC);
                }
            }
            let file = options.open(path)?;

            let direct = if self.direct {
                // Fall back to a synchronous buffered handle if the
                // filesystem refuses to bypass the cache
                match bypass_cache(&file) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %err,
                            "direct I/O unavailable, falling back to buffered I/O"
                        );
                        false
                    }
                }
            } else {
                false
            };

            if !direct {
                disable_readahead(&file);
            }

            tracing::debug!(path = %path.display(), ?mode, direct, "opened");
            Ok(Box::new(PlatformFile::new(file, direct)))
        }
    }
}

/// Create a new platform-specific disk I/O instance
pub fn create_disk_io() -> PlatformDiskIO {
    PlatformDiskIO::new()
}
