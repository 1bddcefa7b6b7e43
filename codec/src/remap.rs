//! Mapping of transmitted entity indices to local ones.

use std::collections::HashMap;

use crate::value::Value;

/// Maps a transmitted entity index to a local entity index.
///
/// Consulted on decode for record indices and `ref` values. Indices without
/// an entry pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    entries: HashMap<u32, u32>,
}

impl IdentityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `remote` to `local`, returning the previous local index if any.
    pub fn insert(&mut self, remote: u32, local: u32) -> Option<u32> {
        self.entries.insert(remote, local)
    }

    /// Removes the entry for `remote`.
    pub fn remove(&mut self, remote: u32) -> Option<u32> {
        self.entries.remove(&remote)
    }

    /// Returns the explicit mapping for `remote`, if any.
    #[must_use]
    pub fn get(&self, remote: u32) -> Option<u32> {
        self.entries.get(&remote).copied()
    }

    /// Resolves `remote` to a local index.
    #[must_use]
    pub fn resolve(&self, remote: u32) -> u32 {
        self.get(remote).unwrap_or(remote)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<u32, u32>> for IdentityMap {
    fn from(entries: HashMap<u32, u32>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(u32, u32)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(u32, u32)> for IdentityMap {
    fn extend<I: IntoIterator<Item = (u32, u32)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Resolves through an optional map.
pub(crate) fn resolve(map: Option<&IdentityMap>, remote: u32) -> u32 {
    map.map_or(remote, |map| map.resolve(remote))
}

/// Remaps a decoded `Ref`; other values pass through.
pub(crate) fn resolve_value(map: Option<&IdentityMap>, value: Value) -> Value {
    match value {
        Value::Ref(remote) => Value::Ref(resolve(map, remote)),
        other => other,
    }
}
