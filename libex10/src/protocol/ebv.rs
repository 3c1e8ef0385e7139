// libex10-rs/libex10/src/protocol/ebv.rs

//! Extensible bit vectors (EBV).
//!
//! A value is split into 7-bit groups, most significant group first. Every
//! byte except the last carries 0x80 as a "more bytes follow" flag.

use crate::protocol::bits::{bit_pack, bit_unpack_u32};
use crate::{Error, Result};

const EBV_VALUE_MASK: u8 = 0x7f;
const EBV_EXTEND_FLAG: u8 = 0x80;

/// Longest EBV accepted by the decoder. Five groups cover a full u32.
pub const MAX_EBV_BYTES: usize = 5;

/// Bits `bit_pack_ebv` will produce for `value`.
pub fn get_ebv_bit_len(value: u32) -> usize {
    if value < 128 {
        8
    } else {
        8 + get_ebv_bit_len(value / 128)
    }
}

fn pack_ebv_groups(buf: &mut [u8], bit_offset: usize, value: u32, extend: bool) -> Result<usize> {
    let mut pos = bit_offset;
    if value >= 128 {
        pos = pack_ebv_groups(buf, pos, value / 128, true)?;
    }
    let flag = if extend { EBV_EXTEND_FLAG } else { 0 };
    let group = (value % 128) as u8 | flag;
    bit_pack(buf, pos, u32::from(group), 8)
}

/// Pack `value` as an EBV at `bit_offset`. Returns the bit position after it.
pub fn bit_pack_ebv(buf: &mut [u8], bit_offset: usize, value: u32) -> Result<usize> {
    pack_ebv_groups(buf, bit_offset, value, false)
}

/// Combine EBV groups from a little-endian unpack buffer, `bytes[0]` being
/// the final (least significant) group.
pub fn bit_unpack_ebv(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .rev()
        .fold(0u32, |acc, b| acc.wrapping_mul(128) | u32::from(b & EBV_VALUE_MASK))
}

/// Number of bytes of the EBV starting at `bit_offset`, found by following
/// the continuation flags.
pub fn ebv_length_decode(data: &[u8], bit_offset: usize) -> Result<usize> {
    for n in 0..MAX_EBV_BYTES {
        let byte = bit_unpack_u32(data, bit_offset + n * 8, 8)? as u8;
        if byte & EBV_EXTEND_FLAG == 0 {
            return Ok(n + 1);
        }
    }
    Err(Error::BadParamValue(format!(
        "ebv longer than {} bytes",
        MAX_EBV_BYTES
    )))
}
