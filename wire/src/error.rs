//! Error types for record framing.

use std::fmt;

use bytestream::ByteError;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while framing or parsing record headers and masks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// Read or write ran past the buffer.
    Bytes(ByteError),

    /// A record declares more fields than any mask width can carry.
    MaskTooWide { fields: usize, max: usize },

    /// A decoded mask has bits set at or above the record's field count.
    InvalidMask { mask: u32, field_count: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(err) => write!(f, "{err}"),
            Self::MaskTooWide { fields, max } => {
                write!(f, "change mask for {fields} fields exceeds {max} bits")
            }
            Self::InvalidMask { mask, field_count } => {
                write!(
                    f,
                    "change mask 0x{mask:08X} has bits beyond field count {field_count}"
                )
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ByteError> for WireError {
    fn from(err: ByteError) -> Self {
        Self::Bytes(err)
    }
}
