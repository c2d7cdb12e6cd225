//! Error types for amfpack

use std::fmt;

use thiserror::Error;

/// Result type alias using the library's error type
pub type Result<T> = std::result::Result<T, AmfError>;

/// The per-session table a reference index points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    String,
    Object,
    Trait,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::String => write!(f, "string"),
            ReferenceKind::Object => write!(f, "object"),
            ReferenceKind::Trait => write!(f, "trait"),
        }
    }
}

/// AMF3 encoding/decoding errors
#[derive(Debug, Error, PartialEq)]
pub enum AmfError {
    /// Buffer exhausted before a field completed
    #[error("Unexpected end of AMF data")]
    TruncatedInput,

    /// Reference index at or past the end of its table
    #[error("Invalid AMF {kind} reference: {index} (table size {len})")]
    InvalidReference {
        kind: ReferenceKind,
        index: usize,
        len: usize,
    },

    /// String payload is not valid UTF-8
    #[error("Invalid UTF-8 in AMF string")]
    InvalidEncoding,

    #[error("Unknown AMF marker: 0x{0:02x}")]
    UnknownTypeMarker(u8),

    /// Integer outside the 29-bit signed range
    #[error("Integer {0} outside the U29 range")]
    ValueOutOfRange(i64),

    /// Length or index too large to fit in a U29 header
    #[error("Length {0} does not fit in a U29 header")]
    LengthOverflow(usize),

    #[error("AMF nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Associative keys and dynamic member names must be non-empty
    #[error("Empty associative key or member name")]
    EmptyKey,

    /// Sealed value count differs from the trait's member count
    #[error("Trait declares {expected} sealed members but object has {actual}")]
    TraitMismatch { expected: usize, actual: usize },

    /// Member name not in a sealed (non-dynamic) trait
    #[error("Unknown member {0:?} on sealed object")]
    UnknownMember(String),

    /// Externalizable objects need a class registry to (de)serialize
    #[error("Externalizable class not supported: {0:?}")]
    Externalizable(String),

    /// Handle does not name a composite of the expected kind in the heap
    #[error("Invalid heap handle: {0}")]
    InvalidHandle(usize),
}

impl AmfError {
    pub(crate) fn invalid_reference(kind: ReferenceKind, index: usize, len: usize) -> Self {
        AmfError::InvalidReference { kind, index, len }
    }
}
