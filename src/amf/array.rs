//! AMF3 Array (0x09)
//!
//! ```text
//! U29A-value  = U29 ; (dense_count << 1) | 1
//! array-type  = array-marker (U29O-ref | (U29A-value
//!               (UTF-8-empty | *(assoc-value) UTF-8-empty)
//!               *(value-type)))
//! assoc-value = UTF-8-vr value-type
//! ```
//!
//! The array is registered in the object table before any child is read so a
//! child can refer back to the array containing it.

use bytes::BufMut;
use indexmap::IndexMap;

use super::decoder::{Decoder, ObjectHeader};
use super::encoder::Writer;
use super::heap::{Composite, Handle, Heap};
use super::marker;
use super::string::{read_string, write_string};
use super::value::Value;
use super::varint::write_header;
use crate::error::{AmfError, Result};

/// Dense sequence plus ordered associative portion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    dense: Vec<Value>,
    associative: IndexMap<String, Value>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    /// Array with no associative portion
    pub fn from_dense(dense: Vec<Value>) -> Self {
        Self {
            dense,
            associative: IndexMap::new(),
        }
    }

    /// Build from both portions; a repeated key keeps its first position and
    /// its last value
    pub fn from_parts(dense: Vec<Value>, associative: Vec<(String, Value)>) -> Self {
        let mut array = Self::from_dense(dense);
        for (key, value) in associative {
            array.insert(key, value);
        }
        array
    }

    pub fn dense(&self) -> &[Value] {
        &self.dense
    }

    pub fn dense_mut(&mut self) -> &mut Vec<Value> {
        &mut self.dense
    }

    pub fn push(&mut self, value: Value) {
        self.dense.push(value);
    }

    /// Associative members in insertion order
    pub fn associative(&self) -> &IndexMap<String, Value> {
        &self.associative
    }

    /// Look up an associative member
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.associative.get(key)
    }

    /// Insert an associative member, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.associative.insert(key.into(), value)
    }

    /// Dense length
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// True when both portions are empty
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty() && self.associative.is_empty()
    }
}

impl Decoder {
    pub(super) fn read_array(&mut self) -> Result<Value> {
        let count = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(count) => count as usize,
        };

        let handle = self.heap.insert_array(Array::new());
        let value = Value::Array(handle);
        self.objects.insert(value.clone());

        let mut array = Array::new();
        loop {
            let key = read_string(&mut self.buf, &mut self.strings)?;
            if key.is_empty() {
                break;
            }
            let item = self.read_value()?;
            array.insert(key, item);
        }

        array.dense.reserve(self.capacity_hint(count));
        for _ in 0..count {
            let item = self.read_value()?;
            array.dense.push(item);
        }

        self.heap.replace(handle, Composite::Array(array));
        Ok(value)
    }
}

impl Writer {
    pub(super) fn write_array(&mut self, heap: &Heap, handle: Handle) -> Result<()> {
        let array = heap
            .array(handle)
            .ok_or(AmfError::InvalidHandle(handle.index()))?;

        self.buf.put_u8(marker::ARRAY);
        if self.write_object_reference(handle)? {
            return Ok(());
        }

        write_header(&mut self.buf, array.dense.len(), true)?;
        for (key, item) in &array.associative {
            if key.is_empty() {
                return Err(AmfError::EmptyKey);
            }
            write_string(&mut self.buf, key, &mut self.strings)?;
            self.write_value(heap, item)?;
        }
        self.buf.put_u8(marker::EMPTY_STRING);

        for item in &array.dense {
            self.write_value(heap, item)?;
        }
        Ok(())
    }
}
