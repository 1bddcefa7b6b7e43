//! Sparse, page-allocated cell storage.
//!
//! Entity indices span the whole `u32` range, so columns cannot be dense
//! vectors. Cells live in fixed-size pages that are allocated on the first
//! write into them; a cell in a missing page reads as `T::default()`.

use std::collections::BTreeMap;

/// Log2 of the number of cells per page.
pub const PAGE_BITS: u32 = 8;

/// Number of cells per page.
pub const PAGE_LEN: usize = 1 << PAGE_BITS;

const fn split(index: usize) -> (usize, usize) {
    (index >> PAGE_BITS, index & (PAGE_LEN - 1))
}

/// Index-addressed cells backed by lazily allocated pages.
///
/// `len` is one past the highest index ever written (including neutral
/// writes); it is logical and costs no memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedVec<T> {
    pages: BTreeMap<usize, Box<[T]>>,
    len: usize,
}

impl<T> Default for PagedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PagedVec<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pages: BTreeMap::new(),
            len: 0,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cells actually allocated.
    #[must_use]
    pub fn allocated_cells(&self) -> usize {
        self.pages.len() * PAGE_LEN
    }

    /// Returns the stored cell, or `None` past the end or in a missing page.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let (page, slot) = split(index);
        self.pages.get(&page).map(|cells| &cells[slot])
    }

    /// Drops every page.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.len = 0;
    }
}

impl<T: Default + PartialEq> PagedVec<T> {
    fn page_mut(&mut self, index: usize) -> &mut T {
        self.len = self.len.max(index.saturating_add(1));
        let (page, slot) = split(index);
        let cells = self
            .pages
            .entry(page)
            .or_insert_with(|| (0..PAGE_LEN).map(|_| T::default()).collect());
        &mut cells[slot]
    }

    /// Stores `value` at `index`, allocating its page if needed.
    pub fn set(&mut self, index: usize, value: T) {
        *self.page_mut(index) = value;
    }

    /// Stores `value` at `index` and returns the previous cell.
    ///
    /// A value equal to neutral written into a missing page allocates
    /// nothing; the cell keeps reading as `T::default()`.
    pub fn replace(&mut self, index: usize, value: T) -> T {
        let (page, _) = split(index);
        if !self.pages.contains_key(&page) && value == T::default() {
            self.len = self.len.max(index.saturating_add(1));
            return T::default();
        }
        std::mem::replace(self.page_mut(index), value)
    }

    /// Resets the cell at `index` to neutral without changing the length.
    pub fn reset(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        let (page, slot) = split(index);
        if let Some(cells) = self.pages.get_mut(&page) {
            cells[slot] = T::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pages_read_as_none() {
        let mut cells = PagedVec::<u32>::new();
        assert!(cells.is_empty());
        cells.set(3, 9);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells.get(3), Some(&9));
        assert_eq!(cells.get(0), Some(&0));
        assert_eq!(cells.get(4), None);
        assert_eq!(cells.allocated_cells(), PAGE_LEN);
    }

    #[test]
    fn high_index_allocates_one_page() {
        let mut cells = PagedVec::<String>::new();
        let index = 1usize << 31;
        cells.set(index, "far".to_owned());
        assert_eq!(cells.len(), index + 1);
        assert_eq!(cells.get(index).map(String::as_str), Some("far"));
        assert_eq!(cells.get(index - 1).map(String::as_str), Some(""));
        assert_eq!(cells.get(7), None);
        assert_eq!(cells.allocated_cells(), PAGE_LEN);
    }

    #[test]
    fn neutral_write_extends_without_allocating() {
        let mut cells = PagedVec::<f64>::new();
        assert!(cells.replace(u32::MAX as usize, 0.0).abs() < f64::EPSILON);
        assert_eq!(cells.len(), u32::MAX as usize + 1);
        assert_eq!(cells.allocated_cells(), 0);
    }

    #[test]
    fn set_keeps_exact_bits() {
        let mut cells = PagedVec::<f32>::new();
        cells.set(40, -0.0);
        assert_eq!(cells.allocated_cells(), PAGE_LEN);
        assert!(cells.get(40).is_some_and(|v| v.is_sign_negative()));
    }

    #[test]
    fn replace_returns_previous() {
        let mut cells = PagedVec::<i16>::new();
        assert_eq!(cells.replace(PAGE_LEN + 1, -4), 0);
        assert_eq!(cells.replace(PAGE_LEN + 1, 6), -4);
        assert_eq!(cells.replace(PAGE_LEN + 1, 0), 6);
        assert_eq!(cells.allocated_cells(), PAGE_LEN);
    }

    #[test]
    fn reset_and_clear() {
        let mut cells = PagedVec::<Option<Vec<u8>>>::new();
        cells.set(2, Some(vec![1]));
        cells.reset(2);
        cells.reset(500);
        assert_eq!(cells.get(2), Some(&None));
        assert_eq!(cells.len(), 3);
        cells.clear();
        assert!(cells.is_empty());
        assert_eq!(cells.allocated_cells(), 0);
    }
}
