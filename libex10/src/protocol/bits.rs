// libex10-rs/libex10/src/protocol/bits.rs

//! Bit-accurate packing of Gen2 command fields.
//!
//! Gen2 commands are big-endian bit streams: the first bit sent is the most
//! significant bit of the first byte. Integer fields are written most
//! significant bit first (`bit_pack`), variable length fields are copied as
//! left-justified bit streams (`bit_pack_msb_bits`, `bit_pack_span`).

use crate::constants::TX_COMMAND_DECODE_BUFFER_SIZE;
use crate::protocol::ebv;
use crate::types::{BitSpan, bytes_for_bits};
use crate::{Error, Result};

/// Value returned by the unpackers, sized for the largest Gen2 field.
pub type UnpackBuffer = [u8; TX_COMMAND_DECODE_BUFFER_SIZE];

const MAX_UNPACK_BITS: usize = TX_COMMAND_DECODE_BUFFER_SIZE * 8;

fn ensure_bits(total_bits: usize, bit_offset: usize, bit_count: usize) -> Result<()> {
    if bit_offset + bit_count > total_bits {
        return Err(Error::InvalidLength {
            expected: bytes_for_bits(bit_offset + bit_count),
            actual: bytes_for_bits(total_bits),
        });
    }
    Ok(())
}

#[inline]
fn get_bit(data: &[u8], pos: usize) -> u8 {
    (data[pos / 8] >> (7 - pos % 8)) & 1
}

#[inline]
fn put_bit(buf: &mut [u8], pos: usize, bit: u8) {
    let mask = 1u8 << (7 - pos % 8);
    if bit != 0 {
        buf[pos / 8] |= mask;
    } else {
        buf[pos / 8] &= !mask;
    }
}

/// Pack the low `bit_count` bits of `data` at `bit_offset`, most significant
/// bit first. Returns the bit position following the field.
pub fn bit_pack(buf: &mut [u8], bit_offset: usize, data: u32, bit_count: usize) -> Result<usize> {
    if bit_count > 32 {
        return Err(Error::BadParamValue(format!(
            "bit count {} exceeds 32",
            bit_count
        )));
    }
    let max = (1u64 << bit_count) - 1;
    if u64::from(data) > max {
        return Err(Error::BadParamValue(format!(
            "value {:#x} does not fit in {} bits",
            data, bit_count
        )));
    }
    ensure_bits(buf.len() * 8, bit_offset, bit_count)?;

    for i in 0..bit_count {
        let bit = ((data >> (bit_count - 1 - i)) & 1) as u8;
        put_bit(buf, bit_offset + i, bit);
    }
    Ok(bit_offset + bit_count)
}

/// Pack the top `bit_count` bits of `data` at `bit_offset`. Used for the
/// trailing partial byte of a variable length field.
pub fn bit_pack_msb_bits(
    buf: &mut [u8],
    bit_offset: usize,
    data: u8,
    bit_count: usize,
) -> Result<usize> {
    if bit_count >= 8 {
        return Err(Error::BadParamValue(format!(
            "msb bit count {} must be below 8",
            bit_count
        )));
    }
    if bit_count == 0 {
        return Ok(bit_offset);
    }
    bit_pack(buf, bit_offset, u32::from(data >> (8 - bit_count)), bit_count)
}

/// Copy `bit_count` bits of the left-justified stream `src` to `bit_offset`.
pub fn bit_pack_bytes(
    buf: &mut [u8],
    bit_offset: usize,
    src: &[u8],
    bit_count: usize,
) -> Result<usize> {
    if src.len() * 8 < bit_count {
        return Err(Error::NullPointer("variable length field has no data"));
    }
    let full_bytes = bit_count / 8;
    let mut pos = bit_offset;
    for byte in &src[..full_bytes] {
        pos = bit_pack(buf, pos, u32::from(*byte), 8)?;
    }
    let rem = bit_count % 8;
    if rem > 0 {
        pos = bit_pack_msb_bits(buf, pos, src[full_bytes], rem)?;
    }
    Ok(pos)
}

/// Copy a whole `BitSpan` to `bit_offset`.
pub fn bit_pack_span(buf: &mut [u8], bit_offset: usize, span: &BitSpan) -> Result<usize> {
    bit_pack_bytes(buf, bit_offset, span.as_bytes(), span.len())
}

/// Unpack `bit_count` bits at `bit_offset` as an integer. The result is
/// little-endian: `out[0]` holds the least significant byte.
pub fn bit_unpack(data: &[u8], bit_offset: usize, bit_count: usize) -> Result<UnpackBuffer> {
    if bit_count > MAX_UNPACK_BITS {
        return Err(Error::InvalidLength {
            expected: TX_COMMAND_DECODE_BUFFER_SIZE,
            actual: bytes_for_bits(bit_count),
        });
    }
    ensure_bits(data.len() * 8, bit_offset, bit_count)?;

    let mut out = [0u8; TX_COMMAND_DECODE_BUFFER_SIZE];
    for i in 0..bit_count {
        let bit = get_bit(data, bit_offset + bit_count - 1 - i);
        out[i / 8] |= bit << (i % 8);
    }
    Ok(out)
}

/// Unpack `bit_count` bits at `bit_offset` as a left-justified bit stream.
pub fn bit_unpack_msb(data: &[u8], bit_offset: usize, bit_count: usize) -> Result<UnpackBuffer> {
    if bit_count > MAX_UNPACK_BITS {
        return Err(Error::InvalidLength {
            expected: TX_COMMAND_DECODE_BUFFER_SIZE,
            actual: bytes_for_bits(bit_count),
        });
    }
    ensure_bits(data.len() * 8, bit_offset, bit_count)?;

    let mut out = [0u8; TX_COMMAND_DECODE_BUFFER_SIZE];
    for i in 0..bit_count {
        let bit = get_bit(data, bit_offset + i);
        out[i / 8] |= bit << (7 - i % 8);
    }
    Ok(out)
}

/// Unpack a field of at most 32 bits.
pub fn bit_unpack_u32(data: &[u8], bit_offset: usize, bit_count: usize) -> Result<u32> {
    if bit_count > 32 {
        return Err(Error::BadParamValue(format!(
            "bit count {} exceeds 32",
            bit_count
        )));
    }
    let raw = bit_unpack(data, bit_offset, bit_count)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Sequential field writer over a zeroed buffer.
#[derive(Debug)]
pub struct BitWriter {
    buf: Vec<u8>,
    pos: usize,
    total_bits: usize,
}

impl BitWriter {
    /// A writer for a command of exactly `total_bits` bits.
    pub fn with_bit_len(total_bits: usize) -> Self {
        Self {
            buf: vec![0u8; bytes_for_bits(total_bits)],
            pos: 0,
            total_bits,
        }
    }

    /// Bits written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Append the low `bit_count` bits of `value`.
    pub fn put(&mut self, value: u32, bit_count: usize) -> Result<&mut Self> {
        self.pos = bit_pack(&mut self.buf, self.pos, value, bit_count)?;
        Ok(self)
    }

    /// Append one bit.
    pub fn put_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.put(u32::from(value), 1)
    }

    /// Append `value` as an EBV.
    pub fn put_ebv(&mut self, value: u32) -> Result<&mut Self> {
        self.pos = ebv::bit_pack_ebv(&mut self.buf, self.pos, value)?;
        Ok(self)
    }

    /// Append every bit of `span`.
    pub fn put_span(&mut self, span: &BitSpan) -> Result<&mut Self> {
        self.pos = bit_pack_span(&mut self.buf, self.pos, span)?;
        Ok(self)
    }

    /// Finish the command. The written length must match the length the
    /// writer was sized for.
    pub fn finish(self) -> Result<BitSpan> {
        if self.pos != self.total_bits {
            return Err(Error::Gen2CommandEncode(format!(
                "packed {} bits, expected {}",
                self.pos, self.total_bits
            )));
        }
        BitSpan::new(self.buf, self.pos)
    }
}

/// Sequential field reader over an encoded command.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    total_bits: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Reader positioned at the first bit of `span`.
    pub fn new(span: &'a BitSpan) -> Self {
        Self {
            data: span.as_bytes(),
            total_bits: span.len(),
            pos: 0,
        }
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left after the current position.
    pub fn remaining(&self) -> usize {
        self.total_bits.saturating_sub(self.pos)
    }

    /// Read a field of at most 32 bits.
    pub fn get(&mut self, bit_count: usize) -> Result<u32> {
        ensure_bits(self.total_bits, self.pos, bit_count)?;
        let value = bit_unpack_u32(self.data, self.pos, bit_count)?;
        self.pos += bit_count;
        Ok(value)
    }

    /// Read one bit.
    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get(1)? != 0)
    }

    /// Read an EBV. The whole EBV must lie inside the span.
    pub fn get_ebv(&mut self) -> Result<u32> {
        let num_bytes = ebv::ebv_length_decode(self.data, self.pos)?;
        ensure_bits(self.total_bits, self.pos, num_bytes * 8)?;
        let raw = bit_unpack(self.data, self.pos, num_bytes * 8)?;
        self.pos += num_bytes * 8;
        Ok(ebv::bit_unpack_ebv(&raw[..num_bytes]))
    }

    /// Read `bit_count` bits as a left-justified span.
    pub fn get_span(&mut self, bit_count: usize) -> Result<BitSpan> {
        ensure_bits(self.total_bits, self.pos, bit_count)?;
        let raw = bit_unpack_msb(self.data, self.pos, bit_count)?;
        self.pos += bit_count;
        BitSpan::new(raw[..bytes_for_bits(bit_count)].to_vec(), bit_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_byte_aligned() {
        let mut buf = [0u8; 2];
        assert_eq!(bit_pack(&mut buf, 0, 0xC2, 8).unwrap(), 8);
        assert_eq!(bit_pack(&mut buf, 8, 0x5, 4).unwrap(), 12);
        assert_eq!(buf, [0xC2, 0x50]);
    }

    #[test]
    fn pack_spanning_byte_boundary() {
        let mut buf = [0u8; 2];
        let end = bit_pack(&mut buf, 5, 0b1_0110_1, 6).unwrap();
        assert_eq!(end, 11);
        assert_eq!(buf, [0b0000_0101, 0b1010_0000]);
    }

    #[test]
    fn pack_rejects_value_wider_than_field() {
        let mut buf = [0u8; 1];
        match bit_pack(&mut buf, 0, 4, 2) {
            Err(Error::BadParamValue(_)) => {}
            other => panic!("expected BadParamValue, got: {:?}", other),
        }
        assert_eq!(buf, [0]);
    }

    #[test]
    fn pack_full_width_u32() {
        let mut buf = [0u8; 4];
        bit_pack(&mut buf, 0, u32::MAX, 32).unwrap();
        assert_eq!(buf, [0xff; 4]);
    }

    #[test]
    fn pack_past_end_fails() {
        let mut buf = [0u8; 1];
        assert!(matches!(
            bit_pack(&mut buf, 4, 0xff, 8),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn msb_pack_uses_high_bits() {
        let mut buf = [0u8; 1];
        assert_eq!(bit_pack_msb_bits(&mut buf, 2, 0b1010_0000, 3).unwrap(), 5);
        assert_eq!(buf, [0b0010_1000]);
        assert!(bit_pack_msb_bits(&mut buf, 0, 0xff, 8).is_err());
    }

    #[test]
    fn pack_bytes_with_remainder() {
        let mut buf = [0u8; 3];
        let end = bit_pack_bytes(&mut buf, 4, &[0xAB, 0xC0], 11).unwrap();
        assert_eq!(end, 15);
        assert_eq!(buf, [0x0A, 0xBC, 0x00]);
    }

    #[test]
    fn pack_bytes_missing_data() {
        let mut buf = [0u8; 4];
        match bit_pack_bytes(&mut buf, 0, &[], 4) {
            Err(Error::NullPointer(_)) => {}
            other => panic!("expected NullPointer, got: {:?}", other),
        }
    }

    #[test]
    fn unpack_is_little_endian_value() {
        let data = [0x0A, 0xBC];
        let raw = bit_unpack(&data, 4, 12).unwrap();
        assert_eq!(raw[0], 0xBC);
        assert_eq!(raw[1], 0x0A);
        assert_eq!(bit_unpack_u32(&data, 4, 12).unwrap(), 0xABC);
    }

    #[test]
    fn unpack_msb_is_left_justified() {
        let data = [0x0A, 0xBC];
        let raw = bit_unpack_msb(&data, 4, 11).unwrap();
        assert_eq!(&raw[..2], &[0xAB, 0xC0]);
    }

    #[test]
    fn unpack_out_of_range() {
        let data = [0u8; 2];
        assert!(bit_unpack(&data, 10, 8).is_err());
        assert!(bit_unpack(&[0u8; 64], 0, 400).is_err());
    }

    #[test]
    fn writer_and_reader_walk_the_same_fields() {
        let mut w = BitWriter::with_bit_len(3 + 13 + 8 + 5);
        w.put(0, 5).unwrap();
        w.put(0b101, 3).unwrap();
        w.put(0x1abc, 13).unwrap();
        w.put(0x5a, 8).unwrap();
        let span = w.finish().unwrap();

        let mut r = BitReader::new(&span);
        assert_eq!(r.get(5).unwrap(), 0);
        assert_eq!(r.get(3).unwrap(), 0b101);
        assert_eq!(r.get(13).unwrap(), 0x1abc);
        assert_eq!(r.get(8).unwrap(), 0x5a);
        assert_eq!(r.remaining(), 0);
        assert!(r.get(1).is_err());
    }

    #[test]
    fn writer_detects_short_fill() {
        let mut w = BitWriter::with_bit_len(16);
        w.put(0xff, 8).unwrap();
        match w.finish() {
            Err(Error::Gen2CommandEncode(_)) => {}
            other => panic!("expected Gen2CommandEncode, got: {:?}", other),
        }
    }

    #[test]
    fn reader_ebv_must_end_inside_span() {
        // 0x81 0x00 is the two byte EBV for 128
        let whole = BitSpan::from_bytes(&[0x81, 0x00]);
        assert_eq!(BitReader::new(&whole).get_ebv().unwrap(), 128);

        let cut = BitSpan::new(vec![0x81, 0x00], 9).unwrap();
        let mut r = BitReader::new(&cut);
        match r.get_ebv() {
            Err(Error::InvalidLength { .. }) => {}
            other => panic!("expected InvalidLength, got: {:?}", other),
        }
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn reader_span_round_trip() {
        let mask = BitSpan::new(vec![0xde, 0xa0], 11).unwrap();
        let mut w = BitWriter::with_bit_len(3 + 11);
        w.put(0b111, 3).unwrap();
        w.put_span(&mask).unwrap();
        let span = w.finish().unwrap();

        let mut r = BitReader::new(&span);
        r.get(3).unwrap();
        assert_eq!(r.get_span(11).unwrap(), mask);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pack_then_unpack_any_offset(offset in 0usize..16, width in 1usize..=32, value in any::<u32>()) {
            let value = if width == 32 { value } else { value & ((1u32 << width) - 1) };
            let mut buf = [0u8; 8];
            let end = bit_pack(&mut buf, offset, value, width).unwrap();
            prop_assert_eq!(end, offset + width);
            prop_assert_eq!(bit_unpack_u32(&buf, offset, width).unwrap(), value);
        }
    }
}
