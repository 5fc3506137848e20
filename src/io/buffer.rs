use std::alloc::{self, Layout};
use std::io;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

/// Heap buffer whose start address satisfies the alignment required by
/// uncached I/O. The contents are zero-initialized.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The buffer owns its allocation exclusively.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `size` zeroed bytes aligned to `alignment`
    pub fn new(size: usize, alignment: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Buffer size must be greater than 0",
            ));
        }
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("could not allocate {} aligned bytes", size),
            )
        })?;

        Ok(Self { ptr, layout })
    }
}

impl Deref for AlignedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: ptr points to layout.size() initialized bytes owned by self.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated in `new` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.layout.size())
            .field("alignment", &self.layout.align())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_buffer_alignment() {
        let buffer = AlignedBuffer::new(4096, 4096).unwrap();
        assert_eq!(buffer.len(), 4096);
        assert_eq!(buffer.as_ptr() as usize % 4096, 0);
    }

    #[test]
    fn test_aligned_buffer_zeroed_and_writable() {
        let mut buffer = AlignedBuffer::new(512, 512).unwrap();
        assert!(buffer.iter().all(|&b| b == 0));

        buffer[0] = 42;
        buffer[511] = 7;
        assert_eq!(buffer[0], 42);
        assert_eq!(buffer[511], 7);
    }

    #[test]
    fn test_aligned_buffer_rejects_bad_input() {
        assert_eq!(
            AlignedBuffer::new(0, 512).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert_eq!(
            AlignedBuffer::new(512, 3).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
    }
}
