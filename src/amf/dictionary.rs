//! AMF3 Dictionary (0x11)
//!
//! ```text
//! U29Dict-value   = U29 ; (entry_count << 1) | 1
//! dictionary-type = marker (U29O-ref | (U29Dict-value weak-keys
//!                   *(value-type value-type)))
//! weak-keys       = U8
//! ```

use std::hash::{Hash, Hasher};

use bytes::BufMut;
use indexmap::{Equivalent, IndexMap};

use super::decoder::{Decoder, ObjectHeader};
use super::encoder::Writer;
use super::heap::{Composite, Handle, Heap};
use super::marker;
use super::value::Value;
use super::varint::write_header;
use crate::error::{AmfError, Result};

/// Map with arbitrary value keys, in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    /// Keys held weakly by the Flash runtime
    pub weak_keys: bool,
    entries: IndexMap<EntryKey, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&KeyRef(key))
    }

    /// Insert an entry, returning the value it replaced
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(EntryKey(key), value)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    pub fn get_index(&self, index: usize) -> Option<(&Value, &Value)> {
        self.entries.get_index(index).map(|(k, v)| (&k.0, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dictionary key; doubles and dates compare by bit pattern
#[derive(Debug, Clone)]
struct EntryKey(Value);

/// Borrowed lookup form of [`EntryKey`]
struct KeyRef<'a>(&'a Value);

fn same_key(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Double(x), Value::Double(y)) | (Value::Date(x), Value::Date(y)) => {
            x.to_bits() == y.to_bits()
        }
        _ => a == b,
    }
}

fn hash_key<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Undefined | Value::Null => {}
        Value::Boolean(b) => b.hash(state),
        Value::Integer(i) => i.hash(state),
        Value::Double(n) | Value::Date(n) => n.to_bits().hash(state),
        Value::String(s) | Value::XmlDocument(s) | Value::Xml(s) => s.hash(state),
        Value::ByteArray(bytes) => bytes.hash(state),
        Value::Array(h) | Value::Object(h) | Value::Vector(h) | Value::Dictionary(h) => {
            h.hash(state)
        }
    }
}

impl PartialEq for EntryKey {
    fn eq(&self, other: &Self) -> bool {
        same_key(&self.0, &other.0)
    }
}

impl Eq for EntryKey {}

impl Hash for EntryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(&self.0, state);
    }
}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(self.0, state);
    }
}

impl Equivalent<EntryKey> for KeyRef<'_> {
    fn equivalent(&self, key: &EntryKey) -> bool {
        same_key(self.0, &key.0)
    }
}

impl Decoder {
    pub(super) fn read_dictionary(&mut self) -> Result<Value> {
        let count = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(count) => count as usize,
        };
        let weak_keys = self.read_flag()?;

        let handle = self.heap.insert_dictionary(Dictionary::new());
        let value = Value::Dictionary(handle);
        self.objects.insert(value.clone());

        let mut dictionary = Dictionary {
            weak_keys,
            entries: IndexMap::with_capacity(self.capacity_hint(count)),
        };
        for _ in 0..count {
            let key = self.read_value()?;
            let entry = self.read_value()?;
            dictionary.insert(key, entry);
        }

        self.heap.replace(handle, Composite::Dictionary(dictionary));
        Ok(value)
    }
}

impl Writer {
    pub(super) fn write_dictionary(&mut self, heap: &Heap, handle: Handle) -> Result<()> {
        let dictionary = heap
            .dictionary(handle)
            .ok_or(AmfError::InvalidHandle(handle.index()))?;

        self.buf.put_u8(marker::DICTIONARY);
        if self.write_object_reference(handle)? {
            return Ok(());
        }

        write_header(&mut self.buf, dictionary.entries.len(), true)?;
        self.buf.put_u8(u8::from(dictionary.weak_keys));
        for (key, entry) in dictionary.entries() {
            self.write_value(heap, key)?;
            self.write_value(heap, entry)?;
        }
        Ok(())
    }
}
