//! AMF3 decoder
//!
//! A [`Decoder`] is one decoding session over one buffer. Every value starts
//! with a marker byte; [`Decoder::read_data_type`] reads the marker, dispatches
//! to the matching codec and leaves the cursor on the next top-level value.
//!
//! The string, object and trait tables live for the whole session, so later
//! values may reference strings and composites seen in earlier ones.

use bytes::{Buf, Bytes};

use super::config::DecoderConfig;
use super::double::read_double;
use super::heap::Heap;
use super::marker;
use super::object::Trait;
use super::reference::ReferenceTable;
use super::string::{read_string, read_utf8};
use super::value::Value;
use super::varint::{read_i29, read_u29};
use crate::error::{AmfError, ReferenceKind, Result};

/// First field of every object-table type
pub(super) enum ObjectHeader {
    /// Previously decoded value from the object table
    Reference(Value),
    /// Inline value; the U29 with its low flag bit shifted out
    Inline(u32),
}

/// AMF3 decoding session
pub struct Decoder {
    pub(super) buf: Bytes,
    /// Length of the buffer at construction
    total_len: usize,
    pub(super) strings: ReferenceTable<String>,
    pub(super) objects: ReferenceTable<Value>,
    pub(super) traits: ReferenceTable<Trait>,
    pub(super) heap: Heap,
    config: DecoderConfig,
    /// Current nesting depth
    depth: usize,
}

impl Decoder {
    /// Create a decoder over `data` with default settings
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_config(data, DecoderConfig::default())
    }

    /// Create a decoder over a copy of `data`
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub fn with_config(data: impl Into<Bytes>, config: DecoderConfig) -> Self {
        let buf = data.into();
        Self {
            total_len: buf.len(),
            buf,
            strings: ReferenceTable::new(ReferenceKind::String),
            objects: ReferenceTable::new(ReferenceKind::Object),
            traits: ReferenceTable::new(ReferenceKind::Trait),
            heap: Heap::new(),
            config,
            depth: 0,
        }
    }

    /// Offset of the cursor from the start of the buffer
    pub fn position(&self) -> usize {
        self.total_len - self.buf.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    /// Composites decoded so far
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// End the session, keeping the decoded composites
    pub fn into_heap(self) -> Heap {
        self.heap
    }

    /// Decode the next value
    ///
    /// On error the session is unusable: the cursor and tables may reflect a
    /// partially read value.
    pub fn read_data_type(&mut self) -> Result<Value> {
        let offset = self.position();
        let result = self.read_value();
        if let Err(e) = &result {
            tracing::debug!(offset = offset, error = %e, "AMF3 decode failed");
        }
        result
    }

    /// Decode all values from buffer until exhausted
    pub fn decode_all(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while self.buf.has_remaining() {
            values.push(self.read_data_type()?);
        }
        Ok(values)
    }

    /// Decode one value, marker included; used for nested values as well
    pub(super) fn read_value(&mut self) -> Result<Value> {
        if !self.buf.has_remaining() {
            return Err(AmfError::TruncatedInput);
        }
        if self.depth >= self.config.max_depth {
            return Err(AmfError::NestingTooDeep(self.config.max_depth));
        }

        self.depth += 1;
        let type_marker = self.buf.get_u8();
        let result = self.decode_value(type_marker);
        self.depth -= 1;
        result
    }

    fn decode_value(&mut self, type_marker: u8) -> Result<Value> {
        match type_marker {
            marker::UNDEFINED => Ok(Value::Undefined),
            marker::NULL => Ok(Value::Null),
            marker::FALSE => Ok(Value::Boolean(false)),
            marker::TRUE => Ok(Value::Boolean(true)),
            marker::INTEGER => Ok(Value::Integer(read_i29(&mut self.buf)?)),
            marker::DOUBLE => Ok(Value::Double(read_double(&mut self.buf)?)),
            marker::STRING => Ok(Value::String(read_string(&mut self.buf, &mut self.strings)?)),
            marker::XML_DOCUMENT => self.decode_xml(Value::XmlDocument),
            marker::DATE => self.decode_date(),
            marker::ARRAY => self.read_array(),
            marker::OBJECT => self.read_object(),
            marker::XML => self.decode_xml(Value::Xml),
            marker::BYTE_ARRAY => self.decode_byte_array(),
            marker::VECTOR_INT
            | marker::VECTOR_UINT
            | marker::VECTOR_DOUBLE
            | marker::VECTOR_OBJECT => self.read_vector(type_marker),
            marker::DICTIONARY => self.read_dictionary(),
            _ => {
                tracing::trace!(marker = type_marker, "Unknown AMF3 marker");
                Err(AmfError::UnknownTypeMarker(type_marker))
            }
        }
    }

    /// Read the U29O-ref / inline header shared by all object-table types
    pub(super) fn read_object_header(&mut self) -> Result<ObjectHeader> {
        let header = read_u29(&mut self.buf)?;
        if header & 1 == 0 {
            let index = (header >> 1) as usize;
            tracing::trace!(index = index, "AMF3 object reference");
            return Ok(ObjectHeader::Reference(self.objects.get(index)?.clone()));
        }
        Ok(ObjectHeader::Inline(header >> 1))
    }

    /// Initial capacity for a collection of `count` elements read off the wire
    pub(super) fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.config.max_preallocation).min(self.buf.remaining())
    }

    pub(super) fn read_flag(&mut self) -> Result<bool> {
        if !self.buf.has_remaining() {
            return Err(AmfError::TruncatedInput);
        }
        Ok(self.buf.get_u8() != 0)
    }

    fn decode_date(&mut self) -> Result<Value> {
        if let ObjectHeader::Reference(value) = self.read_object_header()? {
            return Ok(value);
        }
        let date = Value::Date(read_double(&mut self.buf)?);
        self.objects.insert(date.clone());
        Ok(date)
    }

    fn decode_xml(&mut self, wrap: fn(String) -> Value) -> Result<Value> {
        let len = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(len) => len as usize,
        };
        let xml = wrap(read_utf8(&mut self.buf, len)?);
        self.objects.insert(xml.clone());
        Ok(xml)
    }

    fn decode_byte_array(&mut self) -> Result<Value> {
        let len = match self.read_object_header()? {
            ObjectHeader::Reference(value) => return Ok(value),
            ObjectHeader::Inline(len) => len as usize,
        };
        if self.buf.remaining() < len {
            return Err(AmfError::TruncatedInput);
        }
        let bytes = Value::ByteArray(self.buf.copy_to_bytes(len).to_vec());
        self.objects.insert(bytes.clone());
        Ok(bytes)
    }
}

/// Convenience function to decode a single value
pub fn decode(data: &[u8]) -> Result<(Value, Heap)> {
    let mut decoder = Decoder::from_slice(data);
    let value = decoder.read_data_type()?;
    Ok((value, decoder.into_heap()))
}

/// Convenience function to decode all values
pub fn decode_all(data: &[u8]) -> Result<(Vec<Value>, Heap)> {
    let mut decoder = Decoder::from_slice(data);
    let values = decoder.decode_all()?;
    Ok((values, decoder.into_heap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let (values, _) = decode_all(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x7f]).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Undefined,
                Value::Null,
                Value::Boolean(false),
                Value::Boolean(true),
                Value::Integer(0x7f),
            ]
        );
    }

    #[test]
    fn test_integer_vectors() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (0x35, &[0x35]),
            (0x80, &[0x81, 0x00]),
            (0x1a53f, &[0x86, 0xca, 0x3f]),
            (-0x2a, &[0xff, 0xff, 0xff, 0xd6]),
            (-0x1000_0000, &[0xc0, 0x80, 0x80, 0x00]),
        ];
        for (expected, encoding) in cases {
            let mut data = vec![marker::INTEGER];
            data.extend_from_slice(encoding);
            let mut decoder = Decoder::new(data);
            assert_eq!(decoder.read_data_type().unwrap(), Value::Integer(*expected));
            assert!(!decoder.has_remaining());
        }
    }

    #[test]
    fn test_double() {
        let data = [0x05, 0x3f, 0xb9, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a];
        let (value, _) = decode(&data).unwrap();
        assert_eq!(value, Value::Double(0.1));
    }

    #[test]
    fn test_string_references_across_values() {
        let mut decoder = Decoder::new(Bytes::from_static(b"\x06\x0bhello\x06\x00\x06\x01"));
        assert_eq!(decoder.read_data_type().unwrap(), Value::String("hello".into()));
        assert_eq!(decoder.read_data_type().unwrap(), Value::String("hello".into()));
        assert_eq!(decoder.read_data_type().unwrap(), Value::String(String::new()));
        assert_eq!(decoder.position(), 11);
    }

    #[test]
    fn test_invalid_string_reference() {
        let err = Decoder::new(Bytes::from_static(b"\x06\x02")).read_data_type().unwrap_err();
        assert_eq!(err, AmfError::invalid_reference(ReferenceKind::String, 1, 0));
    }

    #[test]
    fn test_unknown_marker() {
        let err = Decoder::from_slice(&[0x12]).read_data_type().unwrap_err();
        assert_eq!(err, AmfError::UnknownTypeMarker(0x12));
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(
            Decoder::from_slice(&[]).read_data_type(),
            Err(AmfError::TruncatedInput)
        );
    }

    #[test]
    fn test_date_and_byte_array_share_object_table() {
        let mut data = vec![marker::DATE, 0x01];
        data.extend_from_slice(&1_500_000_000_000f64.to_be_bytes());
        data.extend_from_slice(&[marker::BYTE_ARRAY, 0x07, 0xde, 0xad, 0xbe]);
        // References to slot 0 (the date) and slot 1 (the bytes)
        data.extend_from_slice(&[marker::DATE, 0x00, marker::BYTE_ARRAY, 0x02]);

        let (values, _) = decode_all(&data).unwrap();
        assert_eq!(values[0], Value::Date(1_500_000_000_000.0));
        assert_eq!(values[1], Value::ByteArray(vec![0xde, 0xad, 0xbe]));
        assert_eq!(values[2], values[0]);
        assert_eq!(values[3], values[1]);
    }

    #[test]
    fn test_xml() {
        let (value, _) = decode(b"\x0b\x09<a/>").unwrap();
        assert_eq!(value, Value::Xml("<a/>".into()));

        let (value, _) = decode(b"\x07\x09<b/>").unwrap();
        assert_eq!(value, Value::XmlDocument("<b/>".into()));
    }

    #[test]
    fn test_truncated_byte_array() {
        let err = decode(&[0x0c, 0x07, 0x01]).unwrap_err();
        assert_eq!(err, AmfError::TruncatedInput);
    }
}
