//! AMF3 type markers and wire constants
//!
//! Reference: AMF 3 Specification (amf3_spec_121207.pdf), section 3.1

// ============================================================================
// Type markers
// ============================================================================

pub const UNDEFINED: u8 = 0x00;
pub const NULL: u8 = 0x01;
pub const FALSE: u8 = 0x02;
pub const TRUE: u8 = 0x03;

/// U29 signed integer
pub const INTEGER: u8 = 0x04;

/// IEEE 754 double, big-endian
pub const DOUBLE: u8 = 0x05;

/// UTF-8-vr string
pub const STRING: u8 = 0x06;

/// Legacy flash.xml.XMLDocument
pub const XML_DOCUMENT: u8 = 0x07;

pub const DATE: u8 = 0x08;
pub const ARRAY: u8 = 0x09;
pub const OBJECT: u8 = 0x0A;

/// E4X XML
pub const XML: u8 = 0x0B;

pub const BYTE_ARRAY: u8 = 0x0C;
pub const VECTOR_INT: u8 = 0x0D;
pub const VECTOR_UINT: u8 = 0x0E;
pub const VECTOR_DOUBLE: u8 = 0x0F;
pub const VECTOR_OBJECT: u8 = 0x10;
pub const DICTIONARY: u8 = 0x11;

// ============================================================================
// U29 limits
// ============================================================================

/// Smallest integer representable as a U29 (-2^28)
pub const INTEGER_MIN: i32 = -(1 << 28);

/// Largest integer representable as a U29 (2^28 - 1)
pub const INTEGER_MAX: i32 = (1 << 28) - 1;

/// Largest raw U29 value (29 bits set)
pub const U29_MAX: u32 = (1 << 29) - 1;

/// Largest length or index that fits in a U29 header after the flag shift
pub const U28_MAX: usize = (1 << 28) - 1;

/// Header flag for an inline (non-reference) value
pub const INLINE: u32 = 0x01;

/// The single-byte encoding of the empty string (`(0 << 1) | 1`)
pub const EMPTY_STRING: u8 = 0x01;

/// Vector.<Object> type name meaning "any class"
pub const ANY_TYPE_NAME: &str = "*";
