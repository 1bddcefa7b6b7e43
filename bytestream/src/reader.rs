//! Byte reader with bounded operations.

use crate::error::{ByteError, ByteResult};

/// A byte reader for decoding big-endian binary data.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the total length of the underlying data.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> ByteResult<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `i16`.
    pub fn read_i16(&mut self) -> ByteResult<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `i32`.
    pub fn read_i32(&mut self) -> ByteResult<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `f32`.
    pub fn read_f32(&mut self) -> ByteResult<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `f64`.
    pub fn read_f64(&mut self) -> ByteResult<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Reads `len` raw bytes, borrowing them from the underlying data.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure_bytes(self.pos, len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a big-endian `u32` located `skip` bytes ahead without advancing.
    pub fn peek_u32(&self, skip: usize) -> ByteResult<u32> {
        let start = self.pos.saturating_add(skip);
        self.ensure_bytes(start, 4)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.data[start..start + 4]);
        Ok(u32::from_be_bytes(out))
    }

    fn ensure_bytes(&self, offset: usize, bytes: usize) -> ByteResult<()> {
        let available = self.data.len().saturating_sub(offset);
        if bytes > available {
            return Err(ByteError::EndOfBuffer {
                offset,
                requested: bytes,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.ensure_bytes(self.pos, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}
