// libex10-rs/libex10/src/types.rs

use crate::{Error, Result};

/// Number of bytes needed to hold `bits` bits.
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// BitSpan - ビット長付きのバイト列
///
/// Gen2 fields (masks, messages, whole commands) are bit streams that do not
/// end on a byte boundary. `length` is in bits and the data is left-justified:
/// the first bit of the stream is the most significant bit of `data[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitSpan {
    data: Vec<u8>,
    length: usize,
}

impl BitSpan {
    /// Build a span of `length` bits backed by `data`.
    ///
    /// `data` must hold at least `length` bits. Bytes and bits past
    /// `length` are dropped so equal streams compare equal.
    pub fn new(mut data: Vec<u8>, length: usize) -> Result<Self> {
        let needed = bytes_for_bits(length);
        if data.len() < needed {
            return Err(Error::InvalidLength {
                expected: needed,
                actual: data.len(),
            });
        }
        data.truncate(needed);
        let tail = length % 8;
        if let (Some(last), true) = (data.last_mut(), tail != 0) {
            *last &= 0xffu8 << (8 - tail);
        }
        Ok(Self { data, length })
    }

    /// A span covering every bit of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            length: bytes.len() * 8,
        }
    }

    /// A zero-length span.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.length
    }

    /// True when the span holds no bits.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Bytes that carry the span's bits.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes needed to hold every bit.
    pub fn byte_len(&self) -> usize {
        bytes_for_bits(self.length)
    }

    /// Hex of the backing bytes.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex_spaced(self.as_bytes())
    }
}
