//! Deterministic schema hashing.

use blake3::Hasher;

use crate::{ComponentKind, Schema, ScalarType, TypeDesc};

/// Computes a deterministic fingerprint of a schema's wire layout.
///
/// Two peers whose fingerprints match encode and decode identical packets.
/// Component order, field order, names and types all contribute.
#[must_use]
pub fn schema_hash(schema: &Schema) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, schema.components.len() as u32);

    for component in &schema.components {
        write_str(&mut hasher, &component.name);
        match &component.kind {
            ComponentKind::Column(ty) => {
                write_u8(&mut hasher, 0);
                write_type(&mut hasher, ty);
            }
            ComponentKind::Record(fields) => {
                write_u8(&mut hasher, 1);
                write_u32(&mut hasher, fields.len() as u32);
                for field in fields {
                    write_str(&mut hasher, &field.name);
                    write_type(&mut hasher, &field.ty);
                }
            }
        }
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

fn write_type(hasher: &mut Hasher, ty: &TypeDesc) {
    match ty {
        TypeDesc::Scalar(tag) => {
            write_u8(hasher, 0);
            write_u8(hasher, scalar_code(*tag));
        }
        TypeDesc::ArrayOf(element) => {
            write_u8(hasher, 1);
            write_type(hasher, element);
        }
    }
}

const fn scalar_code(tag: ScalarType) -> u8 {
    match tag {
        ScalarType::U8 => 0,
        ScalarType::I8 => 1,
        ScalarType::U16 => 2,
        ScalarType::I16 => 3,
        ScalarType::U32 => 4,
        ScalarType::I32 => 5,
        ScalarType::F32 => 6,
        ScalarType::F64 => 7,
        ScalarType::Str => 8,
        ScalarType::Ref => 9,
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
