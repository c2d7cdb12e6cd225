//! Per-session reference tables
//!
//! AMF3 deduplicates strings, composites and traits by sending the position of
//! the first occurrence instead of the value itself. Both sides keep an
//! append-only table per session:
//!
//! - the decoder maps index -> value ([`ReferenceTable`])
//! - the encoder maps value identity -> index ([`ReferenceIndex`])
//!
//! Indices never move and tables never shrink while the session lives.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{AmfError, ReferenceKind, Result};

/// Decode-side table: resolves an index to the instance first seen there
#[derive(Debug, Clone)]
pub struct ReferenceTable<T> {
    kind: ReferenceKind,
    entries: Vec<T>,
}

impl<T> ReferenceTable<T> {
    /// Create an empty table for the given kind of entry
    pub fn new(kind: ReferenceKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Append an entry and return its index
    pub fn insert(&mut self, value: T) -> usize {
        self.entries.push(value);
        self.entries.len() - 1
    }

    /// Resolve an index, failing with `InvalidReference` when out of range
    pub fn get(&self, index: usize) -> Result<&T> {
        self.entries
            .get(index)
            .ok_or_else(|| AmfError::invalid_reference(self.kind, index, self.entries.len()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Encode-side table: finds the index a key was first assigned
#[derive(Debug, Clone)]
pub struct ReferenceIndex<K> {
    positions: HashMap<K, usize>,
    len: usize,
}

impl<K: Hash + Eq> ReferenceIndex<K> {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            len: 0,
        }
    }

    /// Index of a previously inserted key
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(key).copied()
    }

    /// Assign the next index to `key`
    ///
    /// A key already present keeps its original index.
    pub fn insert(&mut self, key: K) -> usize {
        let next = self.len;
        let index = *self.positions.entry(key).or_insert(next);
        if index == next {
            self.len += 1;
        }
        index
    }

    /// Consume a slot without a lookup key
    ///
    /// Values written literally every time (dates, byte arrays, XML) still take
    /// a slot on the decoding side.
    pub fn skip(&mut self) -> usize {
        self.len += 1;
        self.len - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K: Hash + Eq> Default for ReferenceIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_insert_and_get() {
        let mut table = ReferenceTable::new(ReferenceKind::String);
        assert!(table.is_empty());
        assert_eq!(table.insert("a".to_string()), 0);
        assert_eq!(table.insert("b".to_string()), 1);
        assert_eq!(table.get(1).unwrap(), "b");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_out_of_range() {
        let mut table = ReferenceTable::new(ReferenceKind::Trait);
        table.insert(1u8);
        assert_eq!(
            table.get(1),
            Err(AmfError::InvalidReference {
                kind: ReferenceKind::Trait,
                index: 1,
                len: 1,
            })
        );
    }

    #[test]
    fn test_index_first_occurrence_wins() {
        let mut index = ReferenceIndex::new();
        assert_eq!(index.insert("hello".to_string()), 0);
        assert_eq!(index.insert("world".to_string()), 1);
        assert_eq!(index.insert("hello".to_string()), 0);
        assert_eq!(index.position("world"), Some(1));
        assert_eq!(index.position("missing"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_skip_consumes_slot() {
        let mut index = ReferenceIndex::new();
        assert_eq!(index.insert(10u32), 0);
        assert_eq!(index.skip(), 1);
        assert_eq!(index.insert(11u32), 2);
        assert_eq!(index.len(), 3);
    }
}
