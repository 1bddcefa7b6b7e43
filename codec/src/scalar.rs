//! Fixed writer/reader pairs for each scalar tag.
//!
//! Every operation reports the exact number of bytes produced or consumed.
//! Numbers are big-endian; strings are a `u32` byte length followed by UTF-8.

use bytestream::{ByteReader, ByteWriter};
use schema::{ScalarType, TypeDesc};
use wire::LENGTH_PREFIX_SIZE;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::DecodeLimits;
use crate::value::Value;

/// Writes `value` using the encoding of `tag`.
pub fn write_scalar(writer: &mut ByteWriter<'_>, tag: ScalarType, value: &Value) -> CodecResult<usize> {
    let written = match (tag, value) {
        (ScalarType::U8, Value::U8(v)) => writer.write_u8(*v)?,
        (ScalarType::I8, Value::I8(v)) => writer.write_i8(*v)?,
        (ScalarType::U16, Value::U16(v)) => writer.write_u16(*v)?,
        (ScalarType::I16, Value::I16(v)) => writer.write_i16(*v)?,
        (ScalarType::U32, Value::U32(v)) | (ScalarType::Ref, Value::Ref(v)) => {
            writer.write_u32(*v)?
        }
        (ScalarType::I32, Value::I32(v)) => writer.write_i32(*v)?,
        (ScalarType::F32, Value::F32(v)) => writer.write_f32(*v)?,
        (ScalarType::F64, Value::F64(v)) => writer.write_f64(*v)?,
        (ScalarType::Str, Value::Str(text)) => write_str(writer, text)?,
        (tag, value) => {
            return Err(CodecError::TypeMismatch {
                expected: TypeDesc::Scalar(tag),
                found: value.kind_name(),
            })
        }
    };
    Ok(written)
}

/// Reads a value encoded as `tag`, returning it with the bytes consumed.
///
/// `Ref` values are returned as transmitted; remapping is the caller's job.
pub fn read_scalar(
    reader: &mut ByteReader<'_>,
    tag: ScalarType,
    limits: &DecodeLimits,
) -> CodecResult<(Value, usize)> {
    let start = reader.position();
    let value = match tag {
        ScalarType::U8 => Value::U8(reader.read_u8()?),
        ScalarType::I8 => Value::I8(reader.read_i8()?),
        ScalarType::U16 => Value::U16(reader.read_u16()?),
        ScalarType::I16 => Value::I16(reader.read_i16()?),
        ScalarType::U32 => Value::U32(reader.read_u32()?),
        ScalarType::I32 => Value::I32(reader.read_i32()?),
        ScalarType::F32 => Value::F32(reader.read_f32()?),
        ScalarType::F64 => Value::F64(reader.read_f64()?),
        ScalarType::Str => Value::Str(read_str(reader, limits)?),
        ScalarType::Ref => Value::Ref(reader.read_u32()?),
    };
    Ok((value, reader.position() - start))
}

/// Writes a length-prefixed UTF-8 string.
pub fn write_str(writer: &mut ByteWriter<'_>, text: &str) -> CodecResult<usize> {
    let len = u32::try_from(text.len()).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::StringBytes,
        limit: u32::MAX as usize,
        actual: text.len(),
    })?;
    let start = writer.position();
    writer.write_u32(len)?;
    if let Err(err) = writer.write_bytes(text.as_bytes()) {
        writer.rewind(start);
        return Err(err.into());
    }
    Ok(LENGTH_PREFIX_SIZE + text.len())
}

/// Reads a length-prefixed string.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD.
pub fn read_str(reader: &mut ByteReader<'_>, limits: &DecodeLimits) -> CodecResult<String> {
    let len = reader.read_u32()? as usize;
    if len > limits.max_string_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::StringBytes,
            limit: limits.max_string_bytes,
            actual: len,
        });
    }
    let bytes = reader.read_bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Smallest encoding of a value of `ty`, used to bound element counts.
pub(crate) fn min_encoded_len(ty: &TypeDesc) -> usize {
    match ty {
        TypeDesc::ArrayOf(_) => wire::PRESENCE_SIZE,
        TypeDesc::Scalar(tag) => tag.width().unwrap_or(LENGTH_PREFIX_SIZE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(tag: ScalarType, value: &Value) -> Vec<u8> {
        let mut buf = [0u8; 64];
        let mut writer = ByteWriter::new(&mut buf);
        let written = write_scalar(&mut writer, tag, value).unwrap();
        let len = writer.finish();
        assert_eq!(written, len);
        buf[..len].to_vec()
    }

    fn decode(tag: ScalarType, bytes: &[u8]) -> (Value, usize) {
        let mut reader = ByteReader::new(bytes);
        read_scalar(&mut reader, tag, &DecodeLimits::for_testing()).unwrap()
    }

    #[test]
    fn widths_match_tags() {
        for tag in ScalarType::ALL {
            let bytes = encode(tag, &Value::neutral(tag));
            let expected = tag.width().unwrap_or(LENGTH_PREFIX_SIZE);
            assert_eq!(bytes.len(), expected, "{tag}");
        }
    }

    #[test]
    fn big_endian_layout() {
        assert_eq!(encode(ScalarType::U16, &Value::U16(0x0102)), [1, 2]);
        assert_eq!(encode(ScalarType::I16, &Value::I16(-2)), [0xFF, 0xFE]);
        assert_eq!(encode(ScalarType::Ref, &Value::Ref(0x0A0B_0C0D)), [10, 11, 12, 13]);
        assert_eq!(encode(ScalarType::F32, &Value::F32(1.0)), 1.0f32.to_be_bytes());
    }

    #[test]
    fn scalar_roundtrip_bit_exact() {
        let cases = [
            (ScalarType::U8, Value::U8(255)),
            (ScalarType::I8, Value::I8(-128)),
            (ScalarType::U32, Value::U32(u32::MAX)),
            (ScalarType::I32, Value::I32(i32::MIN)),
            (ScalarType::F32, Value::F32(-0.0)),
            (ScalarType::F64, Value::F64(f64::MIN_POSITIVE)),
            (ScalarType::Ref, Value::Ref(1 << 31)),
        ];
        for (tag, value) in cases {
            let bytes = encode(tag, &value);
            let (decoded, read) = decode(tag, &bytes);
            assert_eq!(read, bytes.len());
            assert_eq!(decoded, value);
        }
        let (decoded, _) = decode(ScalarType::F32, &encode(ScalarType::F32, &Value::F32(-0.0)));
        assert!(matches!(decoded, Value::F32(v) if v.is_sign_negative()));
    }

    #[test]
    fn string_roundtrip_multibyte() {
        for text in ["", "hello", "héllo wörld", "日本語", "emoji 😀 pair"] {
            let value = Value::from(text);
            let bytes = encode(ScalarType::Str, &value);
            assert_eq!(bytes.len(), LENGTH_PREFIX_SIZE + text.len());
            assert_eq!(&bytes[..4], &(text.len() as u32).to_be_bytes());
            assert_eq!(decode(ScalarType::Str, &bytes), (value, bytes.len()));
        }
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes = [0, 0, 0, 3, b'a', 0xFF, b'b'];
        let (value, read) = decode(ScalarType::Str, &bytes);
        assert_eq!(value, Value::from("a\u{FFFD}b"));
        assert_eq!(read, 7);
    }

    #[test]
    fn type_mismatch_on_write() {
        let mut buf = [0u8; 8];
        let mut writer = ByteWriter::new(&mut buf);
        let err = write_scalar(&mut writer, ScalarType::Ref, &Value::U32(1)).unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                expected: TypeDesc::reference(),
                found: "u32"
            }
        );
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn truncated_string_fails() {
        let mut reader = ByteReader::new(&[0, 0, 0, 10, b'a']);
        let err = read_str(&mut reader, &DecodeLimits::for_testing()).unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange(_)));
    }

    #[test]
    fn oversized_string_rejected() {
        let mut reader = ByteReader::new(&[0xFF, 0xFF, 0xFF, 0xFF]);
        let err = read_str(&mut reader, &DecodeLimits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::StringBytes,
                ..
            }
        ));
    }

    #[test]
    fn string_that_does_not_fit_leaves_writer_unchanged() {
        let mut buf = [0u8; 6];
        let mut writer = ByteWriter::new(&mut buf);
        assert!(write_str(&mut writer, "too long").is_err());
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn min_lengths() {
        assert_eq!(min_encoded_len(&TypeDesc::f64()), 8);
        assert_eq!(min_encoded_len(&TypeDesc::str()), 4);
        assert_eq!(min_encoded_len(&TypeDesc::array(ScalarType::F64)), 1);
    }
}
