//! amfpack: AMF3 encoder and decoder
//!
//! This library implements the AMF3 binary format:
//! - U29 variable-length integers and big-endian doubles
//! - Strings, objects and traits deduplicated through per-session reference tables
//! - Dense + associative arrays, objects, vectors and dictionaries, including
//!   shared and self-referencing composites
//! - Date, XML and ByteArray values
//!
//! # Example: Encode and decode an array
//!
//! ```
//! use amfpack::{Decoder, Encoder, Value};
//!
//! let mut encoder = Encoder::new();
//! let dense = vec![Value::Integer(0), Value::Integer(1)];
//! encoder.add_array(dense, vec![("name".to_string(), "amf".into())])?;
//!
//! let mut decoder = Decoder::from_slice(encoder.bytes());
//! let value = decoder.read_data_type()?;
//! let array = decoder.heap().array(value.handle().unwrap()).unwrap();
//! assert_eq!(array.dense(), &[Value::Integer(0), Value::Integer(1)]);
//! assert_eq!(array.get("name"), Some(&Value::String("amf".into())));
//! # Ok::<(), amfpack::AmfError>(())
//! ```

pub mod amf;
pub mod error;

// Re-export main types for convenience
pub use amf::{get_signed_varint, get_string, Decoder, Encoder, Handle, Heap, Value};
pub use error::{AmfError, Result};
