//! U29 variable-length integer codec
//!
//! AMF3 packs integers into 1-4 bytes. The first three bytes carry 7 data bits
//! each with the high bit as a continuation flag; a fourth byte, if present,
//! carries a full 8 data bits:
//!
//! ```text
//! 0x00000000 - 0x0000007F : 0xxxxxxx
//! 0x00000080 - 0x00003FFF : 1xxxxxxx 0xxxxxxx
//! 0x00004000 - 0x001FFFFF : 1xxxxxxx 1xxxxxxx 0xxxxxxx
//! 0x00200000 - 0x1FFFFFFF : 1xxxxxxx 1xxxxxxx 1xxxxxxx xxxxxxxx
//! ```
//!
//! Signed values are 29-bit two's complement, so every negative integer needs
//! the full four bytes.

use bytes::{Buf, BufMut};

use super::marker::{INTEGER_MAX, INTEGER_MIN, INLINE, U28_MAX, U29_MAX};
use crate::error::{AmfError, Result};

/// Bit 28, the sign bit of a 29-bit value
const SIGN_BIT: u32 = 1 << 28;

/// Read an unsigned U29 from the buffer
pub fn read_u29<B: Buf>(buf: &mut B) -> Result<u32> {
    let mut acc: u32 = 0;
    for _ in 0..3 {
        if !buf.has_remaining() {
            return Err(AmfError::TruncatedInput);
        }
        let byte = buf.get_u8();
        acc = (acc << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok(acc);
        }
    }

    if !buf.has_remaining() {
        return Err(AmfError::TruncatedInput);
    }
    Ok((acc << 8) | buf.get_u8() as u32)
}

/// Read a signed 29-bit integer from the buffer
pub fn read_i29<B: Buf>(buf: &mut B) -> Result<i32> {
    let raw = read_u29(buf)?;
    // Only a 4-byte encoding can reach bit 28
    if raw & SIGN_BIT != 0 {
        Ok(raw as i32 - (1 << 29))
    } else {
        Ok(raw as i32)
    }
}

/// Number of bytes `write_u29` emits for `value`
pub fn u29_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Write an unsigned U29
///
/// Values above `U29_MAX` fail with `LengthOverflow`.
pub fn write_u29<B: BufMut>(buf: &mut B, value: u32) -> Result<()> {
    if value > U29_MAX {
        return Err(AmfError::LengthOverflow(value as usize));
    }
    put_u29(buf, value);
    Ok(())
}

/// Write a signed 29-bit integer
///
/// Values outside `[-2^28, 2^28 - 1]` fail with `ValueOutOfRange`.
pub fn write_i29<B: BufMut>(buf: &mut B, value: i32) -> Result<()> {
    if !(INTEGER_MIN..=INTEGER_MAX).contains(&value) {
        return Err(AmfError::ValueOutOfRange(value as i64));
    }
    put_u29(buf, (value as u32) & U29_MAX);
    Ok(())
}

/// Write a `(value << 1) | flag` header, the shape shared by every
/// length-or-reference field
pub fn write_header<B: BufMut>(buf: &mut B, value: usize, inline: bool) -> Result<()> {
    check_header(value)?;
    let flag = if inline { INLINE } else { 0 };
    put_u29(buf, ((value as u32) << 1) | flag);
    Ok(())
}

/// Fail with `LengthOverflow` when `value` does not fit a flagged U29 header
pub fn check_header(value: usize) -> Result<()> {
    if value > U28_MAX {
        return Err(AmfError::LengthOverflow(value));
    }
    Ok(())
}

fn put_u29<B: BufMut>(buf: &mut B, value: u32) {
    match u29_len(value) {
        1 => buf.put_u8(value as u8),
        2 => {
            buf.put_u8(0x80 | (value >> 7) as u8);
            buf.put_u8((value & 0x7F) as u8);
        }
        3 => {
            buf.put_u8(0x80 | (value >> 14) as u8);
            buf.put_u8(0x80 | ((value >> 7) & 0x7F) as u8);
            buf.put_u8((value & 0x7F) as u8);
        }
        _ => {
            buf.put_u8(0x80 | ((value >> 22) & 0x7F) as u8);
            buf.put_u8(0x80 | ((value >> 15) & 0x7F) as u8);
            buf.put_u8(0x80 | ((value >> 8) & 0x7F) as u8);
            buf.put_u8((value & 0xFF) as u8);
        }
    }
}

/// Decode a single signed U29 from the start of `bytes`
///
/// Trailing bytes after the varint are ignored.
pub fn get_signed_varint(bytes: &[u8]) -> Result<i32> {
    let mut buf = bytes;
    read_i29(&mut buf)
}
