//! AMF3 (Action Message Format 3) implementation
//!
//! AMF3 is the ActionScript 3.0 serialization format. It keeps three
//! per-session reference tables (strings, objects, traits) so repeated values
//! are sent as small indices, and packs integers into the variable-length U29
//! encoding.
//!
//! Decoded composites live in a [`Heap`] and values carry [`Handle`]s into it,
//! which preserves aliasing and self-reference without reference counting.

pub mod array;
pub mod config;
pub mod decoder;
pub mod dictionary;
pub mod double;
pub mod encoder;
pub mod heap;
pub mod marker;
pub mod object;
pub mod reference;
pub mod string;
pub mod value;
pub mod varint;
pub mod vector;

pub use array::Array;
pub use config::{DecoderConfig, EncoderConfig, IntegerOverflow};
pub use decoder::{decode, decode_all, Decoder};
pub use dictionary::Dictionary;
pub use encoder::{encode, encode_all, Encoder};
pub use heap::{Composite, Handle, Heap};
pub use object::{Object, Trait};
pub use reference::{ReferenceIndex, ReferenceTable};
pub use string::get_string;
pub use value::Value;
pub use varint::get_signed_varint;
pub use vector::{Vector, VectorItems};
