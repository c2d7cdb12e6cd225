//! AMF3 encoder
//!
//! An [`Encoder`] is one encoding session. Each `add_*` call appends a marker
//! byte and payload to the output buffer and may register strings, composites
//! and traits so later values can reference them.
//!
//! Composites are written from the encoder's [`Heap`]: build them there (or
//! hand over a heap from a [`Decoder`](super::Decoder)) and add the resulting
//! [`Value`]. Writing the same [`Handle`] twice sends a reference the second
//! time.

use bytes::{BufMut, Bytes, BytesMut};

use super::array::Array;
use super::config::{EncoderConfig, IntegerOverflow};
use super::double::write_double;
use super::heap::{Handle, Heap};
use super::marker;
use super::object::Trait;
use super::reference::ReferenceIndex;
use super::string::write_string;
use super::value::Value;
use super::varint::{check_header, write_header, write_i29};
use crate::error::{AmfError, Result};

/// Output buffer plus the session's reference tables
///
/// Kept apart from the heap so composites can be borrowed from the heap while
/// their children are written.
pub(super) struct Writer {
    pub(super) buf: BytesMut,
    pub(super) strings: ReferenceIndex<String>,
    pub(super) objects: ReferenceIndex<Handle>,
    pub(super) traits: ReferenceIndex<Trait>,
    config: EncoderConfig,
    depth: usize,
}

impl Writer {
    fn new(config: EncoderConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.initial_capacity),
            strings: ReferenceIndex::new(),
            objects: ReferenceIndex::new(),
            traits: ReferenceIndex::new(),
            config,
            depth: 0,
        }
    }

    /// Write one value, marker included
    pub(super) fn write_value(&mut self, heap: &Heap, value: &Value) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(AmfError::NestingTooDeep(self.config.max_depth));
        }

        self.depth += 1;
        let result = self.encode_value(heap, value);
        self.depth -= 1;
        result
    }

    fn encode_value(&mut self, heap: &Heap, value: &Value) -> Result<()> {
        match value {
            Value::Undefined => self.buf.put_u8(marker::UNDEFINED),
            Value::Null => self.buf.put_u8(marker::NULL),
            Value::Boolean(b) => self.buf.put_u8(if *b { marker::TRUE } else { marker::FALSE }),
            Value::Integer(i) => self.write_integer(*i)?,
            Value::Double(n) => {
                self.buf.put_u8(marker::DOUBLE);
                write_double(&mut self.buf, *n);
            }
            Value::String(s) => self.write_string_value(s)?,
            Value::XmlDocument(s) => self.write_xml(marker::XML_DOCUMENT, s)?,
            Value::Date(ms) => self.write_date(*ms),
            Value::Xml(s) => self.write_xml(marker::XML, s)?,
            Value::ByteArray(bytes) => self.write_byte_array(bytes)?,
            Value::Array(handle) => self.write_array(heap, *handle)?,
            Value::Object(handle) => self.write_object(heap, *handle)?,
            Value::Vector(handle) => self.write_vector(heap, *handle)?,
            Value::Dictionary(handle) => self.write_dictionary(heap, *handle)?,
        }
        Ok(())
    }

    fn write_integer(&mut self, value: i32) -> Result<()> {
        if (marker::INTEGER_MIN..=marker::INTEGER_MAX).contains(&value) {
            self.buf.put_u8(marker::INTEGER);
            return write_i29(&mut self.buf, value);
        }

        match self.config.integer_overflow {
            IntegerOverflow::Error => Err(AmfError::ValueOutOfRange(value as i64)),
            IntegerOverflow::Double => {
                tracing::trace!(value = value, "Integer outside U29 range, writing as double");
                self.buf.put_u8(marker::DOUBLE);
                write_double(&mut self.buf, value as f64);
                Ok(())
            }
        }
    }

    fn write_string_value(&mut self, value: &str) -> Result<()> {
        check_header(value.len())?;
        self.buf.put_u8(marker::STRING);
        write_string(&mut self.buf, value, &mut self.strings)
    }

    fn write_date(&mut self, ms: f64) {
        self.buf.put_u8(marker::DATE);
        self.objects.skip();
        // U29D-value: inline flag, no other bits
        self.buf.put_u8(0x01);
        write_double(&mut self.buf, ms);
    }

    fn write_xml(&mut self, type_marker: u8, xml: &str) -> Result<()> {
        check_header(xml.len())?;
        self.buf.put_u8(type_marker);
        write_header(&mut self.buf, xml.len(), true)?;
        self.buf.put_slice(xml.as_bytes());
        self.objects.skip();
        Ok(())
    }

    fn write_byte_array(&mut self, bytes: &[u8]) -> Result<()> {
        check_header(bytes.len())?;
        self.buf.put_u8(marker::BYTE_ARRAY);
        write_header(&mut self.buf, bytes.len(), true)?;
        self.buf.put_slice(bytes);
        self.objects.skip();
        Ok(())
    }

    /// Write a reference if `handle` was already sent, otherwise register it
    ///
    /// Returns true when a reference was written and the caller is done.
    pub(super) fn write_object_reference(&mut self, handle: Handle) -> Result<bool> {
        if let Some(index) = self.objects.position(&handle) {
            tracing::trace!(handle = %handle, index = index, "AMF3 object reference");
            write_header(&mut self.buf, index, false)?;
            return Ok(true);
        }
        self.objects.insert(handle);
        Ok(false)
    }
}

/// AMF3 encoding session
pub struct Encoder {
    heap: Heap,
    writer: Writer,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::with_config(EncoderConfig::default())
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            heap: Heap::new(),
            writer: Writer::new(config),
        }
    }

    /// Create an encoder that writes composites from an existing heap
    pub fn with_heap(heap: Heap) -> Self {
        Self::with_heap_and_config(heap, EncoderConfig::default())
    }

    pub fn with_heap_and_config(heap: Heap, config: EncoderConfig) -> Self {
        Self {
            heap,
            writer: Writer::new(config),
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Heap for building composites to add
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Encoded bytes so far; the session continues
    pub fn bytes(&self) -> &[u8] {
        &self.writer.buf
    }

    /// Take the encoded bytes, keeping the reference tables
    pub fn finish(&mut self) -> Bytes {
        self.writer.buf.split().freeze()
    }

    /// Get current encoded length
    pub fn len(&self) -> usize {
        self.writer.buf.len()
    }

    /// Check if encoder is empty
    pub fn is_empty(&self) -> bool {
        self.writer.buf.is_empty()
    }

    /// Encode a single value
    ///
    /// On error the session is unusable: the buffer and tables may reflect a
    /// partially written value.
    pub fn add_value(&mut self, value: &Value) -> Result<()> {
        let result = self.writer.write_value(&self.heap, value);
        if let Err(e) = &result {
            tracing::debug!(offset = self.writer.buf.len(), error = %e, "AMF3 encode failed");
        }
        result
    }

    /// Encode multiple values
    pub fn add_all(&mut self, values: &[Value]) -> Result<()> {
        for value in values {
            self.add_value(value)?;
        }
        Ok(())
    }

    pub fn add_undefined(&mut self) {
        self.writer.buf.put_u8(marker::UNDEFINED);
    }

    pub fn add_null(&mut self) {
        self.writer.buf.put_u8(marker::NULL);
    }

    pub fn add_bool(&mut self, value: bool) {
        let m = if value { marker::TRUE } else { marker::FALSE };
        self.writer.buf.put_u8(m);
    }

    /// Encode an integer; see [`EncoderConfig::integer_overflow`] for values
    /// outside 29 bits
    pub fn add_integer(&mut self, value: i32) -> Result<()> {
        self.writer.write_integer(value)
    }

    pub fn add_double(&mut self, value: f64) {
        self.writer.buf.put_u8(marker::DOUBLE);
        write_double(&mut self.writer.buf, value);
    }

    pub fn add_string(&mut self, value: &str) -> Result<()> {
        self.writer.write_string_value(value)
    }

    /// Encode a date given in milliseconds since Unix epoch
    pub fn add_date(&mut self, ms: f64) {
        self.writer.write_date(ms);
    }

    pub fn add_byte_array(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_byte_array(bytes)
    }

    pub fn add_xml(&mut self, xml: &str) -> Result<()> {
        self.writer.write_xml(marker::XML, xml)
    }

    pub fn add_xml_document(&mut self, xml: &str) -> Result<()> {
        self.writer.write_xml(marker::XML_DOCUMENT, xml)
    }

    /// Encode a new array and return its handle
    ///
    /// Adding `Value::Array(handle)` later in the session writes a reference
    /// to this array.
    pub fn add_array(
        &mut self,
        dense: Vec<Value>,
        associative: Vec<(String, Value)>,
    ) -> Result<Handle> {
        let handle = self.heap.insert_array(Array::from_parts(dense, associative));
        self.add_value(&Value::Array(handle))?;
        Ok(handle)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode a single value with composites from `heap`
pub fn encode(heap: &Heap, value: &Value) -> Result<Bytes> {
    encode_all(heap, std::slice::from_ref(value))
}

/// Convenience function to encode multiple values in one session
pub fn encode_all(heap: &Heap, values: &[Value]) -> Result<Bytes> {
    let mut writer = Writer::new(EncoderConfig::default());
    for value in values {
        writer.write_value(heap, value)?;
    }
    Ok(writer.buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_vectors() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (0x7f, &[0x7f]),
            (0xd4, &[0x81, 0x54]),
            (0x3fff, &[0xff, 0x7f]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (0x1f_ffff, &[0xff, 0xff, 0x7f]),
            (0x20_0000, &[0x80, 0xc0, 0x80, 0x00]),
            (-1, &[0xff, 0xff, 0xff, 0xff]),
            (0x0fff_ffff, &[0xbf, 0xff, 0xff, 0xff]),
        ];
        for (value, encoding) in cases {
            let mut encoder = Encoder::new();
            encoder.add_integer(*value).unwrap();
            assert_eq!(encoder.bytes()[0], marker::INTEGER);
            assert_eq!(&encoder.bytes()[1..], *encoding, "value {:#x}", value);
        }
    }

    #[test]
    fn test_integer_overflow_policy() {
        let mut encoder = Encoder::new();
        assert_eq!(
            encoder.add_integer(1 << 28),
            Err(AmfError::ValueOutOfRange(1 << 28))
        );
        assert!(encoder.is_empty());

        let config = EncoderConfig::default().integer_overflow(IntegerOverflow::Double);
        let mut encoder = Encoder::with_config(config);
        encoder.add_integer(1 << 28).unwrap();
        let mut expected = vec![marker::DOUBLE];
        expected.extend_from_slice(&268_435_456f64.to_be_bytes());
        assert_eq!(encoder.bytes(), expected.as_slice());
    }

    #[test]
    fn test_double_vectors() {
        let mut encoder = Encoder::new();
        encoder.add_double(0.123456789);
        assert_eq!(
            encoder.bytes(),
            &[0x05, 0x3f, 0xbf, 0x9a, 0xdd, 0x37, 0x39, 0x63, 0x5f]
        );
    }

    #[test]
    fn test_scalars() {
        let mut encoder = Encoder::new();
        encoder.add_undefined();
        encoder.add_null();
        encoder.add_bool(false);
        encoder.add_bool(true);
        assert_eq!(encoder.bytes(), &[0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_string_reference_second_time() {
        let mut encoder = Encoder::new();
        encoder.add_string("hello").unwrap();
        encoder.add_string("hello").unwrap();
        encoder.add_string("").unwrap();
        assert_eq!(encoder.bytes(), b"\x06\x0bhello\x06\x00\x06\x01");
    }

    #[test]
    fn test_bytes_does_not_reset() {
        let mut encoder = Encoder::new();
        encoder.add_null();
        assert_eq!(encoder.bytes(), &[0x01]);
        encoder.add_null();
        assert_eq!(encoder.bytes(), &[0x01, 0x01]);
        assert_eq!(encoder.len(), 2);
    }

    #[test]
    fn test_finish_keeps_tables() {
        let mut encoder = Encoder::new();
        encoder.add_string("abc").unwrap();
        let first = encoder.finish();
        assert_eq!(&first[..], b"\x06\x07abc");
        assert!(encoder.is_empty());

        encoder.add_string("abc").unwrap();
        assert_eq!(encoder.bytes(), &[0x06, 0x00]);
    }

    #[test]
    fn test_literal_kinds_consume_object_slots() {
        let mut encoder = Encoder::new();
        encoder.add_date(0.0);
        encoder.add_byte_array(&[1, 2]).unwrap();
        let handle = encoder.add_array(vec![], vec![]).unwrap();
        encoder.add_value(&Value::Array(handle)).unwrap();

        let bytes = encoder.bytes();
        // Array header registered at object slot 2
        assert_eq!(&bytes[bytes.len() - 2..], &[marker::ARRAY, 0x04]);
    }

    #[test]
    fn test_xml_roundtrip() {
        let mut encoder = Encoder::new();
        encoder.add_xml("<a/>").unwrap();
        encoder.add_xml_document("<b/>").unwrap();
        let handle = encoder.add_array(vec![], vec![]).unwrap();
        encoder.add_value(&Value::Array(handle)).unwrap();
        assert_eq!(
            encoder.bytes(),
            b"\x0b\x09<a/>\x07\x09<b/>\x09\x01\x01\x09\x04"
        );

        let mut decoder = crate::amf::Decoder::from_slice(encoder.bytes());
        assert_eq!(decoder.read_data_type().unwrap(), Value::Xml("<a/>".into()));
        assert_eq!(
            decoder.read_data_type().unwrap(),
            Value::XmlDocument("<b/>".into())
        );
        let first = decoder.read_data_type().unwrap();
        assert_eq!(decoder.read_data_type().unwrap(), first);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_oversized_literal_writes_nothing() {
        let oversized = vec![0u8; 1 << 28];
        let mut encoder = Encoder::new();
        assert_eq!(
            encoder.add_byte_array(&oversized),
            Err(AmfError::LengthOverflow(1 << 28))
        );
        assert!(encoder.is_empty());

        let text = std::str::from_utf8(&oversized).unwrap();
        assert_eq!(encoder.add_string(text), Err(AmfError::LengthOverflow(1 << 28)));
        assert_eq!(encoder.add_xml(text), Err(AmfError::LengthOverflow(1 << 28)));
        assert!(encoder.is_empty());

        encoder.add_null();
        assert_eq!(encoder.bytes(), &[marker::NULL]);
    }

    #[test]
    fn test_heap_with_config() {
        let mut heap = Heap::new();
        let handle = heap.insert_array(Array::from_dense(vec![Value::Integer(1 << 28)]));
        let config = EncoderConfig::default().integer_overflow(IntegerOverflow::Double);
        let mut encoder = Encoder::with_heap_and_config(heap, config);
        encoder.add_value(&Value::Array(handle)).unwrap();
        assert_eq!(encoder.bytes()[..3], [marker::ARRAY, 0x03, 0x01]);
        assert_eq!(encoder.bytes()[3], marker::DOUBLE);
    }
}
