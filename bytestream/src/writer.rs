//! Bounded byte writer for encoding into a caller-provided buffer.

use crate::error::{ByteError, ByteResult};

/// A byte writer over a fixed-capacity buffer.
///
/// Every write is bounds-checked against the buffer and reports the number
/// of bytes it produced. Numeric values are written big-endian. Call
/// [`finish`](Self::finish) to get the number of bytes used.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    /// Creates a writer positioned at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the total capacity of the backing buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of bytes that can still be written.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) -> ByteResult<usize> {
        self.write_array([value])
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian IEEE-754 `f32`.
    pub fn write_f32(&mut self, value: f32) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes a big-endian IEEE-754 `f64`.
    pub fn write_f64(&mut self, value: f64) -> ByteResult<usize> {
        self.write_array(value.to_be_bytes())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ByteResult<usize> {
        self.ensure_room(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(bytes.len())
    }

    /// Moves the cursor back to `position`, discarding everything after it.
    ///
    /// A position ahead of the cursor is ignored.
    pub fn rewind(&mut self, position: usize) {
        self.pos = self.pos.min(position);
    }

    /// Finishes writing and returns the number of bytes used.
    #[must_use]
    pub const fn finish(self) -> usize {
        self.pos
    }

    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> ByteResult<usize> {
        self.write_bytes(&bytes)
    }

    fn ensure_room(&self, bytes: usize) -> ByteResult<()> {
        if bytes > self.remaining() {
            return Err(ByteError::BufferFull {
                offset: self.pos,
                requested: bytes,
                capacity: self.buf.len(),
            });
        }
        Ok(())
    }
}
