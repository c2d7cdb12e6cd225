//! UTF-8-vr string codec
//!
//! ```text
//! U29S-ref   = U29 ; (index << 1) | 0
//! U29S-value = U29 ; (byte_length << 1) | 1
//! UTF-8-vr   = U29S-ref | (U29S-value *(UTF8-char))
//! ```
//!
//! The empty string is always sent inline and never enters the table.

use bytes::{Buf, BufMut};

use super::marker::EMPTY_STRING;
use super::reference::{ReferenceIndex, ReferenceTable};
use super::varint::{read_u29, write_header};
use crate::error::{AmfError, ReferenceKind, Result};

/// Read a UTF-8-vr string, resolving or registering it in `table`
pub fn read_string<B: Buf>(buf: &mut B, table: &mut ReferenceTable<String>) -> Result<String> {
    let header = read_u29(buf)? as usize;
    if header & 1 == 0 {
        return table.get(header >> 1).cloned();
    }

    let len = header >> 1;
    if len == 0 {
        return Ok(String::new());
    }

    let s = read_utf8(buf, len)?;
    table.insert(s.clone());
    Ok(s)
}

/// Write a UTF-8-vr string, emitting a reference if `index` already holds it
pub fn write_string<B: BufMut>(
    buf: &mut B,
    s: &str,
    index: &mut ReferenceIndex<String>,
) -> Result<()> {
    if s.is_empty() {
        buf.put_u8(EMPTY_STRING);
        return Ok(());
    }

    if let Some(position) = index.position(s) {
        return write_header(buf, position, false);
    }

    write_header(buf, s.len(), true)?;
    buf.put_slice(s.as_bytes());
    index.insert(s.to_string());
    Ok(())
}

/// Read exactly `len` bytes and validate them as UTF-8
pub(crate) fn read_utf8<B: Buf>(buf: &mut B, len: usize) -> Result<String> {
    if buf.remaining() < len {
        return Err(AmfError::TruncatedInput);
    }
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| AmfError::InvalidEncoding)
}

/// Decode a single literal UTF-8-vr string from the start of `bytes`
///
/// There is no table outside a session, so any reference header fails with
/// `InvalidReference`.
pub fn get_string(bytes: &[u8]) -> Result<String> {
    let mut buf = bytes;
    let mut table = ReferenceTable::new(ReferenceKind::String);
    read_string(&mut buf, &mut table)
}
