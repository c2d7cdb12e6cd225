//! Big-endian IEEE 754 double codec

use bytes::{Buf, BufMut};

use crate::error::{AmfError, Result};

/// Size of an encoded double in bytes
pub const DOUBLE_LEN: usize = 8;

/// Read an 8-byte big-endian double
pub fn read_double<B: Buf>(buf: &mut B) -> Result<f64> {
    if buf.remaining() < DOUBLE_LEN {
        return Err(AmfError::TruncatedInput);
    }
    Ok(buf.get_f64())
}

/// Write an 8-byte big-endian double
pub fn write_double<B: BufMut>(buf: &mut B, value: f64) {
    buf.put_f64(value);
}
