//! Error types for codec operations.

use std::fmt;

use bytestream::ByteError;
use schema::{SchemaError, TypeDesc};
use wire::WireError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while building codecs or encoding/decoding packets.
///
/// [`Schema`](Self::Schema) and [`InvalidEpsilon`](Self::InvalidEpsilon) are
/// raised only when a serializer or deserializer is built. The out-of-range
/// family ([`OutOfRange`](Self::OutOfRange),
/// [`UnknownComponent`](Self::UnknownComponent),
/// [`LimitsExceeded`](Self::LimitsExceeded),
/// [`TrailingData`](Self::TrailingData)) aborts the current call.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// The schema failed validation.
    Schema(SchemaError),

    /// The diff epsilon is negative or not finite.
    InvalidEpsilon { epsilon: f64 },

    /// A read or write offset ran past its buffer.
    OutOfRange(ByteError),

    /// A diff record names a component id the deserializer does not have.
    UnknownComponent { id: u32, components: usize },

    /// A decoded length or index exceeds the configured limits.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Bytes remain that cannot form a record.
    TrailingData { offset: usize, remaining: usize },

    /// A change mask has bits set beyond the record's fields.
    InvalidMask { mask: u32, field_count: usize },

    /// A value does not match the type of the column or element it targets.
    TypeMismatch {
        expected: TypeDesc,
        found: &'static str,
    },

    /// The storage handed to a call does not have the schema's shape.
    StorageMismatch(ShapeMismatch),

    /// Named column lookup failed.
    UnknownColumn { component: String, field: String },

    /// Other record framing error.
    Wire(WireError),
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PacketBytes,
    ArrayLength,
    StringBytes,
    EntityIndex,
}

/// How a [`Storage`](crate::Storage) differs from the codec's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    ComponentCount {
        expected: usize,
        actual: usize,
    },
    ColumnCount {
        component: String,
        expected: usize,
        actual: usize,
    },
    ColumnType {
        component: String,
        field: String,
        expected: TypeDesc,
        actual: TypeDesc,
    },
}

impl CodecError {
    /// Returns `true` for the out-of-range family: truncated or malformed
    /// packets, undersized scratch buffers and exceeded limits.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange(_)
                | Self::UnknownComponent { .. }
                | Self::LimitsExceeded { .. }
                | Self::TrailingData { .. }
        )
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::InvalidEpsilon { epsilon } => {
                write!(f, "epsilon must be finite and non-negative, got {epsilon}")
            }
            Self::OutOfRange(e) => write!(f, "out of range: {e}"),
            Self::UnknownComponent { id, components } => {
                write!(
                    f,
                    "unknown component id {id}, deserializer has {components} components"
                )
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::TrailingData { offset, remaining } => {
                write!(f, "{remaining} trailing bytes at offset {offset}")
            }
            Self::InvalidMask { mask, field_count } => {
                write!(
                    f,
                    "invalid change mask 0x{mask:08X} for {field_count} fields"
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} but got {found}")
            }
            Self::StorageMismatch(mismatch) => write!(f, "storage mismatch: {mismatch}"),
            Self::UnknownColumn { component, field } => {
                write!(f, "unknown column {component}.{field}")
            }
            Self::Wire(e) => write!(f, "wire error: {e}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PacketBytes => "packet bytes",
            Self::ArrayLength => "array length",
            Self::StringBytes => "string bytes",
            Self::EntityIndex => "entity index",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComponentCount { expected, actual } => {
                write!(f, "expected {expected} components, got {actual}")
            }
            Self::ColumnCount {
                component,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "component {component}: expected {expected} columns, got {actual}"
                )
            }
            Self::ColumnType {
                component,
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "column {component}.{field}: expected {expected}, got {actual}"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            Self::OutOfRange(e) => Some(e),
            Self::Wire(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for CodecError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<ByteError> for CodecError {
    fn from(err: ByteError) -> Self {
        Self::OutOfRange(err)
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Bytes(e) => Self::OutOfRange(e),
            WireError::InvalidMask { mask, field_count } => {
                Self::InvalidMask { mask, field_count }
            }
            other => Self::Wire(other),
        }
    }
}
