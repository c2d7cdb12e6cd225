//! AMF3 Vector types (0x0D - 0x10)
//!
//! ```text
//! U29V-value   = U29 ; (count << 1) | 1
//! vector-type  = marker (U29O-ref | (U29V-value fixed-flag items))
//! fixed-flag   = U8  ; 0 = variable length, 1 = fixed length
//! int / uint   = count * U32 (big-endian)
//! double       = count * DOUBLE
//! object       = UTF-8-vr type-name, count * value-type
//! ```

use bytes::{Buf, BufMut};

use super::decoder::{Decoder, ObjectHeader};
use super::double::{read_double, write_double, DOUBLE_LEN};
use super::encoder::Writer;
use super::heap::{Composite, Handle, Heap};
use super::marker;
use super::string::{read_string, write_string};
use super::value::Value;
use super::varint::write_header;
use crate::error::{AmfError, Result};

/// Element storage for each vector flavour
#[derive(Debug, Clone, PartialEq)]
pub enum VectorItems {
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Double(Vec<f64>),
    /// Vector.<T> of class `type_name` (`"*"` for any)
    Object {
        type_name: String,
        items: Vec<Value>,
    },
}

/// Typed ActionScript vector
#[derive(Debug, Clone, PartialEq)]
pub struct Vector {
    /// Fixed-length vector
    pub fixed: bool,
    pub items: VectorItems,
}

impl Vector {
    pub fn int(items: Vec<i32>) -> Self {
        Self::variable(VectorItems::Int(items))
    }

    pub fn uint(items: Vec<u32>) -> Self {
        Self::variable(VectorItems::UInt(items))
    }

    pub fn double(items: Vec<f64>) -> Self {
        Self::variable(VectorItems::Double(items))
    }

    pub fn object(type_name: impl Into<String>, items: Vec<Value>) -> Self {
        Self::variable(VectorItems::Object {
            type_name: type_name.into(),
            items,
        })
    }

    /// Mark the vector fixed-length
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    fn variable(items: VectorItems) -> Self {
        Self {
            fixed: false,
            items,
        }
    }

    /// Wire marker for this flavour
    pub fn marker(&self) -> u8 {
        match self.items {
            VectorItems::Int(_) => marker::VECTOR_INT,
            VectorItems::UInt(_) => marker::VECTOR_UINT,
            VectorItems::Double(_) => marker::VECTOR_DOUBLE,
            VectorItems::Object { .. } => marker::VECTOR_OBJECT,
        }
    }

    pub fn len(&self) -> usize {
        match &self.items {
            VectorItems::Int(v) => v.len(),
            VectorItems::UInt(v) => v.len(),
            VectorItems::Double(v) => v.len(),
            VectorItems::Object { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Decoder {
    pub(super) fn read_vector(&mut self, type_marker: u8) -> Result<Value> {
        let count = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(count) => count as usize,
        };
        let fixed = self.read_flag()?;

        let handle = self.heap.insert_vector(Vector::int(Vec::new()));
        let value = Value::Vector(handle);
        self.objects.insert(value.clone());

        let items = match type_marker {
            marker::VECTOR_INT => {
                self.ensure_remaining(count, 4)?;
                VectorItems::Int((0..count).map(|_| self.buf.get_i32()).collect())
            }
            marker::VECTOR_UINT => {
                self.ensure_remaining(count, 4)?;
                VectorItems::UInt((0..count).map(|_| self.buf.get_u32()).collect())
            }
            marker::VECTOR_DOUBLE => {
                self.ensure_remaining(count, DOUBLE_LEN)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(read_double(&mut self.buf)?);
                }
                VectorItems::Double(items)
            }
            _ => {
                let type_name = read_string(&mut self.buf, &mut self.strings)?;
                let mut items = Vec::with_capacity(self.capacity_hint(count));
                for _ in 0..count {
                    items.push(self.read_value()?);
                }
                VectorItems::Object { type_name, items }
            }
        };

        self.heap.replace(handle, Composite::Vector(Vector { fixed, items }));
        Ok(value)
    }

    /// Fail early when `count` fixed-width items cannot all be present
    fn ensure_remaining(&self, count: usize, width: usize) -> Result<()> {
        match count.checked_mul(width) {
            Some(needed) if needed <= self.buf.remaining() => Ok(()),
            _ => Err(AmfError::TruncatedInput),
        }
    }
}

impl Writer {
    pub(super) fn write_vector(&mut self, heap: &Heap, handle: Handle) -> Result<()> {
        let vector = heap
            .vector(handle)
            .ok_or(AmfError::InvalidHandle(handle.index()))?;

        self.buf.put_u8(vector.marker());
        if self.write_object_reference(handle)? {
            return Ok(());
        }

        write_header(&mut self.buf, vector.len(), true)?;
        self.buf.put_u8(u8::from(vector.fixed));

        match &vector.items {
            VectorItems::Int(items) => items.iter().for_each(|i| self.buf.put_i32(*i)),
            VectorItems::UInt(items) => items.iter().for_each(|u| self.buf.put_u32(*u)),
            VectorItems::Double(items) => {
                items.iter().for_each(|n| write_double(&mut self.buf, *n))
            }
            VectorItems::Object { type_name, items } => {
                let type_name = if type_name.is_empty() {
                    marker::ANY_TYPE_NAME
                } else {
                    type_name.as_str()
                };
                write_string(&mut self.buf, type_name, &mut self.strings)?;
                for item in items {
                    self.write_value(heap, item)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::{decode, Encoder};

    fn roundtrip(vector: Vector) -> (Vec<u8>, Vector) {
        let mut encoder = Encoder::new();
        let handle = encoder.heap_mut().insert_vector(vector);
        encoder.add_value(&Value::Vector(handle)).unwrap();
        let bytes = encoder.bytes().to_vec();

        let (value, heap) = decode(&bytes).unwrap();
        let decoded = heap.vector(value.handle().unwrap()).unwrap().clone();
        (bytes, decoded)
    }

    #[test]
    fn test_int_vector() {
        let (bytes, decoded) = roundtrip(Vector::int(vec![1, -1]));
        assert_eq!(
            bytes,
            vec![0x0d, 0x05, 0x00, 0, 0, 0, 1, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(decoded, Vector::int(vec![1, -1]));
    }

    #[test]
    fn test_fixed_uint_vector() {
        let vector = Vector::uint(vec![u32::MAX]).fixed();
        let (bytes, decoded) = roundtrip(vector.clone());
        assert_eq!(bytes, vec![0x0e, 0x03, 0x01, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_double_vector() {
        let vector = Vector::double(vec![0.5, -2.25]);
        let (bytes, decoded) = roundtrip(vector.clone());
        assert_eq!(bytes.len(), 3 + 16);
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_object_vector() {
        let vector = Vector::object("", vec![Value::Integer(5), Value::Null]);
        let (bytes, decoded) = roundtrip(vector);
        assert_eq!(bytes, b"\x10\x05\x00\x03*\x04\x05\x01");
        assert_eq!(decoded, Vector::object("*", vec![Value::Integer(5), Value::Null]));
        assert_eq!(decoded.marker(), marker::VECTOR_OBJECT);
    }

    #[test]
    fn test_truncated_int_vector() {
        // Claims 3 items, carries one
        let err = decode(&[0x0d, 0x07, 0x00, 0, 0, 0, 1]).unwrap_err();
        assert_eq!(err, AmfError::TruncatedInput);
    }
}
