//! AMF3 value types
//!
//! Scalars are held inline. Composites (arrays, objects, vectors,
//! dictionaries) live in a [`Heap`](super::heap::Heap) and a `Value` only
//! carries their [`Handle`], so two positions can alias one instance and a
//! composite can contain itself.

use super::heap::Handle;

/// AMF3 value representation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Undefined (0x00)
    #[default]
    Undefined,

    /// Null (0x01)
    Null,

    /// Boolean, sent as the False (0x02) or True (0x03) marker
    Boolean(bool),

    /// 29-bit signed integer (0x04)
    Integer(i32),

    /// IEEE 754 double-precision floating point (0x05)
    Double(f64),

    /// UTF-8 string (0x06)
    String(String),

    /// Legacy XMLDocument (0x07)
    XmlDocument(String),

    /// Date as milliseconds since Unix epoch, UTC (0x08)
    Date(f64),

    /// E4X XML (0x0B)
    Xml(String),

    /// Raw bytes (0x0C)
    ByteArray(Vec<u8>),

    /// Dense + associative array (0x09)
    Array(Handle),

    /// Object with traits (0x0A)
    Object(Handle),

    /// Typed vector (0x0D - 0x10)
    Vector(Handle),

    /// Dictionary (0x11)
    Dictionary(Handle),
}

impl Value {
    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Heap handle of a composite value
    pub fn handle(&self) -> Option<Handle> {
        match self {
            Value::Array(h) | Value::Object(h) | Value::Vector(h) | Value::Dictionary(h) => {
                Some(*h)
            }
            _ => None,
        }
    }

    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::ByteArray(v)
    }
}
