//! Record headers and packet modes.

use bytestream::{ByteReader, ByteWriter};

use crate::error::WireResult;

/// Size of the entity index that opens every record.
pub const INDEX_SIZE: usize = 4;

/// Size of the component id carried by diff records.
pub const COMPONENT_ID_SIZE: usize = 4;

/// Size of the presence flag that precedes an array value.
pub const PRESENCE_SIZE: usize = 1;

/// Size of the length prefix of strings and arrays.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// How records in a packet are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Every component of every entity, in declared order. No component ids.
    #[default]
    Full,
    /// Only changed components; each record carries its component id and,
    /// for record components, a change mask.
    Diff,
}

impl Mode {
    /// Maps the `diff` option flag to a mode.
    #[must_use]
    pub const fn from_diff(diff: bool) -> Self {
        if diff {
            Self::Diff
        } else {
            Self::Full
        }
    }

    /// Returns `true` for diff framing.
    #[must_use]
    pub const fn is_diff(self) -> bool {
        matches!(self, Self::Diff)
    }
}

/// The fixed prefix of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHeader {
    /// Entity index as transmitted (before any identity remapping).
    pub index: u32,
    /// Component id; present in diff mode only.
    pub component_id: Option<u32>,
}

impl RecordHeader {
    /// Header for a full-mode record.
    #[must_use]
    pub const fn full(index: u32) -> Self {
        Self {
            index,
            component_id: None,
        }
    }

    /// Header for a diff-mode record.
    #[must_use]
    pub const fn diff(index: u32, component_id: u32) -> Self {
        Self {
            index,
            component_id: Some(component_id),
        }
    }

    /// Returns the encoded size in bytes.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        match self.component_id {
            Some(_) => INDEX_SIZE + COMPONENT_ID_SIZE,
            None => INDEX_SIZE,
        }
    }

    /// Writes the header and returns the bytes produced.
    pub fn write(&self, writer: &mut ByteWriter<'_>) -> WireResult<usize> {
        let mut written = writer.write_u32(self.index)?;
        if let Some(component_id) = self.component_id {
            written += writer.write_u32(component_id)?;
        }
        Ok(written)
    }

    /// Reads a header framed for `mode`.
    pub fn read(reader: &mut ByteReader<'_>, mode: Mode) -> WireResult<Self> {
        let index = reader.read_u32()?;
        let component_id = match mode {
            Mode::Full => None,
            Mode::Diff => Some(reader.read_u32()?),
        };
        Ok(Self {
            index,
            component_id,
        })
    }
}

/// Reads the component id of the next diff record without consuming anything.
pub fn peek_component_id(reader: &ByteReader<'_>) -> WireResult<u32> {
    Ok(reader.peek_u32(INDEX_SIZE)?)
}
