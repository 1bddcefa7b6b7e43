//! Per-entity array values.
//!
//! ```text
//! absent:   presence:u8 = 0
//! present:  presence:u8 = 1  count:u32  element...
//! ```
//!
//! Elements of an array-of-array type recurse with their own presence byte.

use bytestream::{ByteError, ByteReader, ByteWriter};
use schema::TypeDesc;
use wire::PRESENCE_SIZE;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::DecodeLimits;
use crate::remap::{self, IdentityMap};
use crate::scalar::{min_encoded_len, read_scalar, write_scalar};
use crate::value::Value;

/// Writes an array value whose elements have type `element`.
///
/// `None` writes a single zero presence byte.
pub fn write_array(
    writer: &mut ByteWriter<'_>,
    element: &TypeDesc,
    value: Option<&[Value]>,
) -> CodecResult<usize> {
    let Some(elements) = value else {
        return Ok(writer.write_u8(0)?);
    };
    let count = u32::try_from(elements.len()).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::ArrayLength,
        limit: u32::MAX as usize,
        actual: elements.len(),
    })?;
    let mut written = writer.write_u8(1)?;
    written += writer.write_u32(count)?;
    for item in elements {
        written += write_element(writer, element, item)?;
    }
    Ok(written)
}

fn write_element(writer: &mut ByteWriter<'_>, ty: &TypeDesc, value: &Value) -> CodecResult<usize> {
    match (ty, value) {
        (TypeDesc::ArrayOf(inner), Value::Array(items)) => write_array(writer, inner, Some(items)),
        (TypeDesc::Scalar(tag), value) => write_scalar(writer, *tag, value),
        (TypeDesc::ArrayOf(_), value) => Err(CodecError::TypeMismatch {
            expected: ty.clone(),
            found: value.kind_name(),
        }),
    }
}

/// Reads an array value whose elements have type `element`.
///
/// Returns `None` for an absent array, along with the bytes consumed. `Ref`
/// elements at any depth are passed through `map`. Counts are checked
/// against `limits` and the remaining input before anything is allocated.
pub fn read_array(
    reader: &mut ByteReader<'_>,
    element: &TypeDesc,
    map: Option<&IdentityMap>,
    limits: &DecodeLimits,
) -> CodecResult<(Option<Vec<Value>>, usize)> {
    let start = reader.position();
    if reader.read_u8()? == 0 {
        return Ok((None, PRESENCE_SIZE));
    }
    let count = reader.read_u32()? as usize;
    if count > limits.max_array_len {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ArrayLength,
            limit: limits.max_array_len,
            actual: count,
        });
    }
    let needed = count.saturating_mul(min_encoded_len(element));
    if needed > reader.remaining() {
        return Err(CodecError::OutOfRange(ByteError::EndOfBuffer {
            offset: reader.position(),
            requested: needed,
            available: reader.remaining(),
        }));
    }

    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(read_element(reader, element, map, limits)?);
    }
    Ok((Some(elements), reader.position() - start))
}

fn read_element(
    reader: &mut ByteReader<'_>,
    ty: &TypeDesc,
    map: Option<&IdentityMap>,
    limits: &DecodeLimits,
) -> CodecResult<Value> {
    match ty {
        TypeDesc::ArrayOf(inner) => {
            let (items, _) = read_array(reader, inner, map, limits)?;
            Ok(Value::Array(items.unwrap_or_default()))
        }
        TypeDesc::Scalar(tag) => {
            let (value, _) = read_scalar(reader, *tag, limits)?;
            Ok(remap::resolve_value(map, value))
        }
    }
}
