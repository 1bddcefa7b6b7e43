//! Error types for byte cursor operations.

use std::fmt;

/// Result type for byte cursor operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading or writing a byte buffer.
///
/// Both variants mean an offset ran past the backing buffer: a truncated or
/// malformed packet on the read side, an undersized scratch buffer on the
/// write side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    EndOfBuffer {
        /// Byte offset of the read.
        offset: usize,
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available from `offset`.
        available: usize,
    },

    /// Attempted to write past the end of the buffer.
    BufferFull {
        /// Byte offset of the write.
        offset: usize,
        /// Number of bytes the write needed.
        requested: usize,
        /// Total buffer capacity in bytes.
        capacity: usize,
    },
}

impl ByteError {
    /// Returns the offset at which the failing access started.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::EndOfBuffer { offset, .. } | Self::BufferFull { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfBuffer {
                offset,
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes at offset {offset} but only {available} bytes available"
                )
            }
            Self::BufferFull {
                offset,
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "attempted to write {requested} bytes at offset {offset} but buffer capacity is {capacity} bytes"
                )
            }
        }
    }
}

impl std::error::Error for ByteError {}
