//! Typed columns and the storage that owns them.

use schema::{ComponentDef, ScalarType, Schema, TypeDesc};

use crate::error::{CodecError, CodecResult};
use crate::paged::PagedVec;
use crate::value::Value;

/// Backing cells of a column, one variant per storage type.
///
/// Cells are paged, so a high entity index only costs the page it lands in.
/// Array cells are `None` when no array value is present for the entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    U8(PagedVec<u8>),
    I8(PagedVec<i8>),
    U16(PagedVec<u16>),
    I16(PagedVec<i16>),
    U32(PagedVec<u32>),
    I32(PagedVec<i32>),
    F32(PagedVec<f32>),
    F64(PagedVec<f64>),
    Str(PagedVec<String>),
    Ref(PagedVec<u32>),
    Array(PagedVec<Option<Vec<Value>>>),
}

macro_rules! each_vec {
    ($data:expr, $vec:ident => $body:expr) => {
        match $data {
            ColumnData::U8($vec) => $body,
            ColumnData::I8($vec) => $body,
            ColumnData::U16($vec) => $body,
            ColumnData::I16($vec) => $body,
            ColumnData::U32($vec) => $body,
            ColumnData::I32($vec) => $body,
            ColumnData::F32($vec) => $body,
            ColumnData::F64($vec) => $body,
            ColumnData::Str($vec) => $body,
            ColumnData::Ref($vec) => $body,
            ColumnData::Array($vec) => $body,
        }
    };
}

fn read<T: Clone + Default>(cells: &PagedVec<T>, index: usize) -> Option<T> {
    (index < cells.len()).then(|| cells.get(index).cloned().unwrap_or_default())
}

impl ColumnData {
    /// Creates empty cells for `ty`.
    #[must_use]
    pub const fn empty(ty: &TypeDesc) -> Self {
        match ty {
            TypeDesc::ArrayOf(_) => Self::Array(PagedVec::new()),
            TypeDesc::Scalar(tag) => match tag {
                ScalarType::U8 => Self::U8(PagedVec::new()),
                ScalarType::I8 => Self::I8(PagedVec::new()),
                ScalarType::U16 => Self::U16(PagedVec::new()),
                ScalarType::I16 => Self::I16(PagedVec::new()),
                ScalarType::U32 => Self::U32(PagedVec::new()),
                ScalarType::I32 => Self::I32(PagedVec::new()),
                ScalarType::F32 => Self::F32(PagedVec::new()),
                ScalarType::F64 => Self::F64(PagedVec::new()),
                ScalarType::Str => Self::Str(PagedVec::new()),
                ScalarType::Ref => Self::Ref(PagedVec::new()),
            },
        }
    }

    /// One past the highest index written.
    #[must_use]
    pub fn len(&self) -> usize {
        each_vec!(self, cells => cells.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells backed by allocated pages.
    #[must_use]
    pub fn allocated_cells(&self) -> usize {
        each_vec!(self, cells => cells.allocated_cells())
    }

    /// Drops every cell.
    pub fn clear(&mut self) {
        each_vec!(self, cells => cells.clear());
    }

    /// Returns the cell at `index` as a [`Value`].
    ///
    /// `None` past the end, or for an array cell with no value.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::U8(cells) => read(cells, index).map(Value::U8),
            Self::I8(cells) => read(cells, index).map(Value::I8),
            Self::U16(cells) => read(cells, index).map(Value::U16),
            Self::I16(cells) => read(cells, index).map(Value::I16),
            Self::U32(cells) => read(cells, index).map(Value::U32),
            Self::I32(cells) => read(cells, index).map(Value::I32),
            Self::F32(cells) => read(cells, index).map(Value::F32),
            Self::F64(cells) => read(cells, index).map(Value::F64),
            Self::Str(cells) => read(cells, index).map(Value::Str),
            Self::Ref(cells) => read(cells, index).map(Value::Ref),
            Self::Array(cells) => read(cells, index).flatten().map(Value::Array),
        }
    }

    /// Stores `value` at `index`, growing as needed.
    ///
    /// Only the outer variant is checked; on mismatch the value is handed back.
    pub(crate) fn store(&mut self, index: usize, value: Value) -> Result<(), Value> {
        match (self, value) {
            (Self::U8(cells), Value::U8(v)) => cells.set(index, v),
            (Self::I8(cells), Value::I8(v)) => cells.set(index, v),
            (Self::U16(cells), Value::U16(v)) => cells.set(index, v),
            (Self::I16(cells), Value::I16(v)) => cells.set(index, v),
            (Self::U32(cells), Value::U32(v)) => cells.set(index, v),
            (Self::I32(cells), Value::I32(v)) => cells.set(index, v),
            (Self::F32(cells), Value::F32(v)) => cells.set(index, v),
            (Self::F64(cells), Value::F64(v)) => cells.set(index, v),
            (Self::Str(cells), Value::Str(v)) => cells.set(index, v),
            (Self::Ref(cells), Value::Ref(v)) => cells.set(index, v),
            (Self::Array(cells), Value::Array(v)) => cells.set(index, Some(v)),
            (_, value) => return Err(value),
        }
        Ok(())
    }

    /// Resets the cell at `index` to its neutral value (absent for arrays).
    pub(crate) fn reset_cell(&mut self, index: usize) {
        each_vec!(self, cells => cells.reset(index));
    }
}

/// A growable, index-addressed column tagged with one [`TypeDesc`].
///
/// Reads past the end yield the neutral value; writes past the end grow the
/// column. Memory is spent only on pages holding non-neutral cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    ty: TypeDesc,
    data: ColumnData,
}

impl Column {
    /// Creates an empty column of type `ty`.
    #[must_use]
    pub fn new(ty: TypeDesc) -> Self {
        let data = ColumnData::empty(&ty);
        Self { ty, data }
    }

    /// Declared type of the column.
    #[must_use]
    pub const fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    /// Resolved scalar tag: the element tag for array columns.
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        self.ty.resolve()
    }

    /// Backing cells.
    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the value at `index`.
    ///
    /// Scalar columns always return a value, the neutral one past the end.
    /// Array columns return `None` when no array is present.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<Value> {
        let cell = self.data.get(index as usize);
        match &self.ty {
            TypeDesc::Scalar(tag) => cell.or_else(|| Some(Value::neutral(*tag))),
            TypeDesc::ArrayOf(_) => cell,
        }
    }

    /// Stores `value` at `index`, growing the column as needed.
    pub fn set(&mut self, index: u32, value: impl Into<Value>) -> CodecResult<()> {
        let value = value.into();
        if !value.matches(&self.ty) {
            return Err(self.mismatch(&value));
        }
        self.store(index, value)
    }

    /// Resets the cell at `index` to neutral; array cells become absent.
    pub fn clear(&mut self, index: u32) {
        self.data.reset_cell(index as usize);
    }

    /// Stores a value already known to match the column's element types.
    pub(crate) fn store(&mut self, index: u32, value: Value) -> CodecResult<()> {
        self.data
            .store(index as usize, value)
            .map_err(|value| self.mismatch(&value))
    }

    fn mismatch(&self, value: &Value) -> CodecError {
        CodecError::TypeMismatch {
            expected: self.ty.clone(),
            found: value.kind_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ComponentColumns {
    name: String,
    fields: Vec<String>,
    columns: Vec<Column>,
}

impl ComponentColumns {
    fn new(component: &ComponentDef) -> Self {
        let (fields, columns) = (0..component.column_count())
            .filter_map(|position| component.column_at(position))
            .map(|(name, ty)| (name.to_owned(), Column::new(ty.clone())))
            .unzip();
        Self {
            name: component.name.clone(),
            fields,
            columns,
        }
    }
}

/// Caller-owned column sets for every component of a schema.
///
/// Columns are addressed by component position and field position, or by a
/// `"Component.field"` path. A column component is addressed by its name
/// alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Storage {
    components: Vec<ComponentColumns>,
}

impl Storage {
    /// Creates empty columns for every component in `schema`.
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        Self {
            components: schema.components.iter().map(ComponentColumns::new).collect(),
        }
    }

    /// Number of components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Columns of the component at `component`, in field order.
    #[must_use]
    pub fn columns(&self, component: usize) -> Option<&[Column]> {
        self.components
            .get(component)
            .map(|entry| entry.columns.as_slice())
    }

    /// Mutable columns of the component at `component`.
    pub fn columns_mut(&mut self, component: usize) -> Option<&mut [Column]> {
        self.components
            .get_mut(component)
            .map(|entry| entry.columns.as_mut_slice())
    }

    /// Looks up a column by path.
    pub fn column(&self, path: &str) -> CodecResult<&Column> {
        let (component, field) = self.locate(path)?;
        Ok(&self.components[component].columns[field])
    }

    /// Looks up a column by path for writing.
    pub fn column_mut(&mut self, path: &str) -> CodecResult<&mut Column> {
        let (component, field) = self.locate(path)?;
        Ok(&mut self.components[component].columns[field])
    }

    /// Reads the value at `index` of the column at `path`.
    pub fn get(&self, path: &str, index: u32) -> CodecResult<Option<Value>> {
        Ok(self.column(path)?.get(index))
    }

    /// Writes `value` at `index` of the column at `path`.
    pub fn set(&mut self, path: &str, index: u32, value: impl Into<Value>) -> CodecResult<()> {
        self.column_mut(path)?.set(index, value)
    }

    fn locate(&self, path: &str) -> CodecResult<(usize, usize)> {
        let (component_name, field_name) = path.split_once('.').unwrap_or((path, path));
        let unknown = || CodecError::UnknownColumn {
            component: component_name.to_owned(),
            field: field_name.to_owned(),
        };
        let component = self
            .components
            .iter()
            .position(|entry| entry.name == component_name)
            .ok_or_else(unknown)?;
        let field = self.components[component]
            .fields
            .iter()
            .position(|name| name == field_name)
            .ok_or_else(unknown)?;
        Ok((component, field))
    }
}
