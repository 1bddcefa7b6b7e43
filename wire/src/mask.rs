//! Change-mask widths for record components.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{WireError, WireResult};

/// Maximum number of fields a change mask can describe.
pub const MAX_MASK_BITS: usize = 32;

/// Encoded width of a record's change mask, derived from its field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskWidth {
    /// Up to 8 fields.
    U8,
    /// Up to 16 fields.
    U16,
    /// Up to 32 fields.
    U32,
}

impl MaskWidth {
    /// Selects the narrowest width that holds one bit per field.
    pub const fn for_field_count(fields: usize) -> WireResult<Self> {
        if fields <= 8 {
            Ok(Self::U8)
        } else if fields <= 16 {
            Ok(Self::U16)
        } else if fields <= MAX_MASK_BITS {
            Ok(Self::U32)
        } else {
            Err(WireError::MaskTooWide {
                fields,
                max: MAX_MASK_BITS,
            })
        }
    }

    /// Returns the encoded size in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Writes `mask` at this width.
    ///
    /// Bits that do not fit the width are an error rather than silently dropped.
    pub fn write(self, writer: &mut ByteWriter<'_>, mask: u32) -> WireResult<usize> {
        let too_wide = || WireError::MaskTooWide {
            fields: 32 - mask.leading_zeros() as usize,
            max: self.bytes() * 8,
        };
        let written = match self {
            Self::U8 => writer.write_u8(u8::try_from(mask).map_err(|_| too_wide())?)?,
            Self::U16 => writer.write_u16(u16::try_from(mask).map_err(|_| too_wide())?)?,
            Self::U32 => writer.write_u32(mask)?,
        };
        Ok(written)
    }

    /// Reads a mask at this width and rejects bits beyond `field_count`.
    pub fn read(self, reader: &mut ByteReader<'_>, field_count: usize) -> WireResult<u32> {
        let mask = match self {
            Self::U8 => u32::from(reader.read_u8()?),
            Self::U16 => u32::from(reader.read_u16()?),
            Self::U32 => reader.read_u32()?,
        };
        if field_count < MAX_MASK_BITS && mask >> field_count != 0 {
            return Err(WireError::InvalidMask { mask, field_count });
        }
        Ok(mask)
    }
}
