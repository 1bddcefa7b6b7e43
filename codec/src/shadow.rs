//! Shadow columns for diff serialization.
//!
//! A shadow holds the value last observed for each cell of a column. Each
//! check compares the live cell against its shadow and then overwrites the
//! shadow, so a diff is relative to the previous check, not the previous
//! packet that was actually delivered.

use std::mem;

use schema::Schema;

use crate::column::{Column, ColumnData};
use crate::paged::PagedVec;

/// Compares `column[index]` with `shadow[index]` and records the current value.
///
/// Missing shadow cells read as neutral, so the first observation of a
/// neutral value reports no change and allocates nothing. `epsilon` applies
/// to `f32` and `f64` columns only; array columns are compared structurally.
pub fn has_changed(shadow: &mut ColumnData, column: &Column, index: u32, epsilon: f64) -> bool {
    let index = index as usize;
    if mem::discriminant(shadow) != mem::discriminant(column.data()) {
        *shadow = ColumnData::empty(column.ty());
    }

    match (shadow, column.data()) {
        (ColumnData::U8(prev), ColumnData::U8(cur)) => track(prev, cur, index),
        (ColumnData::I8(prev), ColumnData::I8(cur)) => track(prev, cur, index),
        (ColumnData::U16(prev), ColumnData::U16(cur)) => track(prev, cur, index),
        (ColumnData::I16(prev), ColumnData::I16(cur)) => track(prev, cur, index),
        (ColumnData::U32(prev), ColumnData::U32(cur))
        | (ColumnData::Ref(prev), ColumnData::Ref(cur)) => track(prev, cur, index),
        (ColumnData::I32(prev), ColumnData::I32(cur)) => track(prev, cur, index),
        (ColumnData::F32(prev), ColumnData::F32(cur)) => {
            track_float(prev, cur, index, epsilon, f64::from)
        }
        (ColumnData::F64(prev), ColumnData::F64(cur)) => {
            track_float(prev, cur, index, epsilon, |v| v)
        }
        (ColumnData::Str(prev), ColumnData::Str(cur)) => track(prev, cur, index),
        (ColumnData::Array(prev), ColumnData::Array(cur)) => track(prev, cur, index),
        // variants were aligned above
        _ => true,
    }
}

fn track<T: Clone + PartialEq + Default>(
    prev: &mut PagedVec<T>,
    cur: &PagedVec<T>,
    index: usize,
) -> bool {
    let current = cur.get(index).cloned().unwrap_or_default();
    let previous = prev.replace(index, current.clone());
    previous != current
}

fn track_float<T: Copy + PartialEq + Default>(
    prev: &mut PagedVec<T>,
    cur: &PagedVec<T>,
    index: usize,
    epsilon: f64,
    widen: impl Fn(T) -> f64,
) -> bool {
    let current = cur.get(index).copied().unwrap_or_default();
    let previous = prev.replace(index, current);
    if epsilon > 0.0 {
        (widen(previous) - widen(current)).abs() > epsilon
    } else {
        previous != current
    }
}

/// One shadow per declared column, addressed by component and field position.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSet {
    slots: Vec<Vec<ColumnData>>,
}

impl ShadowSet {
    /// Allocates an empty shadow for every column declared in `schema`.
    #[must_use]
    pub fn new(schema: &Schema) -> Self {
        let slots = schema
            .components
            .iter()
            .map(|component| component.column_types().map(ColumnData::empty).collect())
            .collect();
        Self { slots }
    }

    /// Shadows of the component at `component`, in field order.
    pub fn component_mut(&mut self, component: usize) -> Option<&mut [ColumnData]> {
        self.slots.get_mut(component).map(Vec::as_mut_slice)
    }

    /// Cells allocated across every shadow.
    #[must_use]
    pub fn allocated_cells(&self) -> usize {
        self.slots.iter().flatten().map(ColumnData::allocated_cells).sum()
    }

    /// Forgets every observed value.
    pub fn reset(&mut self) {
        for shadow in self.slots.iter_mut().flatten() {
            shadow.clear();
        }
    }
}
