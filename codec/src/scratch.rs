//! Reusable output buffer for serialization.

use std::fmt;

/// Fixed-capacity byte buffer allocated once and reused by every call.
#[derive(Clone, Default)]
pub struct ScratchBuffer {
    bytes: Vec<u8>,
}

impl fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("capacity", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

impl ScratchBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Whole buffer, for a writer to fill.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// The first `len` bytes, clamped to the capacity.
    #[must_use]
    pub fn filled(&self, len: usize) -> &[u8] {
        &self.bytes[..len.min(self.bytes.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_fixed() {
        let mut scratch = ScratchBuffer::with_capacity(16);
        assert_eq!(scratch.capacity(), 16);
        scratch.as_mut_slice()[..2].copy_from_slice(&[1, 2]);
        assert_eq!(scratch.filled(2), &[1, 2]);
        assert_eq!(scratch.filled(100).len(), 16);
    }

    #[test]
    fn debug_omits_contents() {
        let scratch = ScratchBuffer::with_capacity(4);
        assert_eq!(format!("{scratch:?}"), "ScratchBuffer { capacity: 4, .. }");
    }

    #[test]
    fn default_is_empty() {
        let scratch = ScratchBuffer::default();
        assert_eq!(scratch.capacity(), 0);
        assert!(scratch.filled(0).is_empty());
    }
}
