//! Random payload written by the generator phase

use crate::io::buffer::AlignedBuffer;
use crate::{BenchError, Result};
use rand::Rng;

const ELEMENT_SIZE: usize = std::mem::size_of::<u32>();

/// A fixed number of pseudo-random `u32`s held in an aligned buffer so
/// the whole payload can be handed to an uncached write in one call.
#[derive(Debug)]
pub struct Payload {
    buffer: AlignedBuffer,
    element_count: usize,
}

impl Payload {
    /// Allocate `element_count` elements and fill them from `rng`
    pub fn random<R: Rng>(
        element_count: u64,
        alignment: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let element_count = usize::try_from(element_count)
            .ok()
            .filter(|&n| n.checked_mul(ELEMENT_SIZE).is_some())
            .ok_or_else(|| {
                BenchError::Config(format!(
                    "Payload of {} elements does not fit in memory on this platform",
                    element_count
                ))
            })?;

        let mut buffer = AlignedBuffer::new(element_count * ELEMENT_SIZE, alignment)
            .map_err(BenchError::Allocation)?;
        for chunk in buffer.chunks_exact_mut(ELEMENT_SIZE) {
            chunk.copy_from_slice(&rng.gen::<u32>().to_ne_bytes());
        }

        Ok(Self {
            buffer,
            element_count,
        })
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }
}
