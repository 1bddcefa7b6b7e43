//! Per-component record codecs.
//!
//! A [`ComponentCodec`] freezes a component's field order and types once and
//! then writes and reads single-entity records:
//!
//! ```text
//! full:  index:u32  field0 field1 ...
//! diff:  index:u32  component_id:u32  [mask]  changed fields...
//! ```
//!
//! Column components never carry a mask; a diff record for them is only
//! written when the single column changed.

use bytestream::{ByteReader, ByteWriter};
use schema::{ComponentDef, TypeDesc};
use wire::{MaskWidth, Mode, RecordHeader};

use crate::array::{read_array, write_array};
use crate::column::{Column, ColumnData};
use crate::error::{CodecError, CodecResult, LimitKind, ShapeMismatch};
use crate::limits::DecodeLimits;
use crate::paged::PagedVec;
use crate::remap::{self, IdentityMap};
use crate::scalar::{read_scalar, write_str};
use crate::shadow::has_changed;
use crate::value::Value;

/// Diff-mode state handed to [`ComponentCodec::serialize`].
#[derive(Debug)]
pub struct DiffState<'a> {
    /// Shadows of the component's columns, in field order.
    pub shadows: &'a mut [ColumnData],
    /// Tolerance for float columns.
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldCodec {
    name: String,
    ty: TypeDesc,
}

/// Encoder/decoder for one component's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCodec {
    name: String,
    fields: Vec<FieldCodec>,
    mask: Option<MaskWidth>,
}

impl ComponentCodec {
    /// Validates `component` and freezes its field order and types.
    pub fn new(component: &ComponentDef) -> CodecResult<Self> {
        component.validate()?;
        let fields: Vec<FieldCodec> = (0..component.column_count())
            .filter_map(|position| component.column_at(position))
            .map(|(name, ty)| FieldCodec {
                name: name.to_owned(),
                ty: ty.clone(),
            })
            .collect();
        let mask = if component.is_record() {
            Some(MaskWidth::for_field_count(fields.len())?)
        } else {
            None
        };
        Ok(Self {
            name: component.name.clone(),
            fields,
            mask,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for record components.
    #[must_use]
    pub const fn is_record(&self) -> bool {
        self.mask.is_some()
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field names in wire order. A column component reports its own name.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| field.name.as_str())
    }

    #[must_use]
    pub fn field_name(&self, position: usize) -> Option<&str> {
        self.fields.get(position).map(|field| field.name.as_str())
    }

    /// Change-mask width; `None` for column components.
    #[must_use]
    pub const fn mask_width(&self) -> Option<MaskWidth> {
        self.mask
    }

    /// Verifies that `columns` have this component's field count and types.
    pub fn check_columns(&self, columns: &[Column]) -> CodecResult<()> {
        if columns.len() != self.fields.len() {
            return Err(CodecError::StorageMismatch(ShapeMismatch::ColumnCount {
                component: self.name.clone(),
                expected: self.fields.len(),
                actual: columns.len(),
            }));
        }
        for (field, column) in self.fields.iter().zip(columns) {
            if column.ty() != &field.ty {
                return Err(CodecError::StorageMismatch(ShapeMismatch::ColumnType {
                    component: self.name.clone(),
                    field: field.name.clone(),
                    expected: field.ty.clone(),
                    actual: column.ty().clone(),
                }));
            }
        }
        Ok(())
    }

    /// Writes the record for entity `index` and returns the bytes produced.
    ///
    /// With `diff`, every column is checked against its shadow first (all
    /// shadows advance) and only changed fields are written; nothing is
    /// written when nothing changed. On error the writer is rewound to where
    /// the record started.
    pub fn serialize(
        &self,
        columns: &[Column],
        diff: Option<DiffState<'_>>,
        writer: &mut ByteWriter<'_>,
        index: u32,
        component_id: u32,
    ) -> CodecResult<usize> {
        self.check_columns(columns)?;
        self.encode(columns, diff, writer, index, component_id)
    }

    /// [`serialize`](Self::serialize) without the shape check.
    pub(crate) fn encode(
        &self,
        columns: &[Column],
        diff: Option<DiffState<'_>>,
        writer: &mut ByteWriter<'_>,
        index: u32,
        component_id: u32,
    ) -> CodecResult<usize> {
        let start = writer.position();
        let result = match diff {
            None => Self::write_full(columns, writer, index),
            Some(state) => self.write_diff(columns, state, writer, index, component_id),
        };
        if result.is_err() {
            writer.rewind(start);
        }
        result
    }

    fn write_full(
        columns: &[Column],
        writer: &mut ByteWriter<'_>,
        index: u32,
    ) -> CodecResult<usize> {
        let mut written = RecordHeader::full(index).write(writer)?;
        for column in columns {
            written += write_cell(writer, column, index)?;
        }
        Ok(written)
    }

    fn write_diff(
        &self,
        columns: &[Column],
        state: DiffState<'_>,
        writer: &mut ByteWriter<'_>,
        index: u32,
        component_id: u32,
    ) -> CodecResult<usize> {
        if state.shadows.len() != columns.len() {
            return Err(CodecError::StorageMismatch(ShapeMismatch::ColumnCount {
                component: self.name.clone(),
                expected: columns.len(),
                actual: state.shadows.len(),
            }));
        }
        let mut mask = 0u32;
        for (bit, (column, shadow)) in columns.iter().zip(state.shadows.iter_mut()).enumerate() {
            if has_changed(shadow, column, index, state.epsilon) {
                mask |= 1 << bit;
            }
        }
        if mask == 0 {
            return Ok(0);
        }

        let mut written = RecordHeader::diff(index, component_id).write(writer)?;
        if let Some(width) = self.mask {
            written += width.write(writer, mask)?;
        }
        for (bit, column) in columns.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                written += write_cell(writer, column, index)?;
            }
        }
        Ok(written)
    }

    /// Reads one record and stores its fields into `columns`.
    ///
    /// The record index and `ref` values go through `map`. An absent array
    /// value leaves the cell untouched. Returns the bytes consumed.
    pub fn deserialize(
        &self,
        columns: &mut [Column],
        reader: &mut ByteReader<'_>,
        mode: Mode,
        map: Option<&IdentityMap>,
        limits: &DecodeLimits,
    ) -> CodecResult<usize> {
        self.check_columns(columns)?;
        self.decode_into(columns, reader, mode, map, limits)
    }

    /// [`deserialize`](Self::deserialize) without the shape check.
    pub(crate) fn decode_into(
        &self,
        columns: &mut [Column],
        reader: &mut ByteReader<'_>,
        mode: Mode,
        map: Option<&IdentityMap>,
        limits: &DecodeLimits,
    ) -> CodecResult<usize> {
        let start = reader.position();
        self.decode_record(reader, mode, map, limits, |index, position, value| {
            columns[position].store(index, value)
        })?;
        Ok(reader.position() - start)
    }

    /// Reads one record, handing each present field to `apply` as
    /// `(local index, field position, value)`.
    pub(crate) fn decode_record<F>(
        &self,
        reader: &mut ByteReader<'_>,
        mode: Mode,
        map: Option<&IdentityMap>,
        limits: &DecodeLimits,
        mut apply: F,
    ) -> CodecResult<RecordHeader>
    where
        F: FnMut(u32, usize, Value) -> CodecResult<()>,
    {
        let header = RecordHeader::read(reader, mode)?;
        let index = remap::resolve(map, header.index);
        if index > limits.max_index {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::EntityIndex,
                limit: limits.max_index as usize,
                actual: index as usize,
            });
        }

        let mask = match (mode, self.mask) {
            (Mode::Diff, Some(width)) => width.read(reader, self.fields.len())?,
            _ => u32::MAX,
        };
        for (position, field) in self.fields.iter().enumerate() {
            if mask & (1 << position) == 0 {
                continue;
            }
            if let Some(value) = read_value(reader, &field.ty, map, limits)? {
                apply(index, position, value)?;
            }
        }
        Ok(header)
    }
}

fn cell<T: Copy + Default>(cells: &PagedVec<T>, index: usize) -> T {
    cells.get(index).copied().unwrap_or_default()
}

fn write_cell(writer: &mut ByteWriter<'_>, column: &Column, index: u32) -> CodecResult<usize> {
    let i = index as usize;
    let written = match column.data() {
        ColumnData::U8(cells) => writer.write_u8(cell(cells, i))?,
        ColumnData::I8(cells) => writer.write_i8(cell(cells, i))?,
        ColumnData::U16(cells) => writer.write_u16(cell(cells, i))?,
        ColumnData::I16(cells) => writer.write_i16(cell(cells, i))?,
        ColumnData::U32(cells) | ColumnData::Ref(cells) => writer.write_u32(cell(cells, i))?,
        ColumnData::I32(cells) => writer.write_i32(cell(cells, i))?,
        ColumnData::F32(cells) => writer.write_f32(cell(cells, i))?,
        ColumnData::F64(cells) => writer.write_f64(cell(cells, i))?,
        ColumnData::Str(cells) => write_str(writer, cells.get(i).map_or("", String::as_str))?,
        ColumnData::Array(cells) => {
            let element = column.ty().element().ok_or_else(|| CodecError::TypeMismatch {
                expected: column.ty().clone(),
                found: "array",
            })?;
            write_array(writer, element, cells.get(i).and_then(Option::as_deref))?
        }
    };
    Ok(written)
}

fn read_value(
    reader: &mut ByteReader<'_>,
    ty: &TypeDesc,
    map: Option<&IdentityMap>,
    limits: &DecodeLimits,
) -> CodecResult<Option<Value>> {
    match ty {
        TypeDesc::ArrayOf(element) => {
            let (elements, _) = read_array(reader, element, map, limits)?;
            Ok(elements.map(Value::Array))
        }
        TypeDesc::Scalar(tag) => {
            let (value, _) = read_scalar(reader, *tag, limits)?;
            Ok(Some(remap::resolve_value(map, value)))
        }
    }
}
