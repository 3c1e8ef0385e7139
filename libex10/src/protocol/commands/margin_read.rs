// libex10-rs/libex10/src/protocol/commands/margin_read.rs

use super::{Gen2CommandType, MemoryBank, command_reader, command_writer, required_span};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarginReadCommandArgs {
    pub memory_bank: MemoryBank,
    pub bit_pointer: u32,
    pub bit_length: u8,
    pub mask: Option<BitSpan>,
}

/// Encode a MarginRead (16-bit opcode 0xE001).
pub fn encode_margin_read(args: &MarginReadCommandArgs) -> Result<BitSpan> {
    let mask = required_span(&args.mask, "margin read mask")?;
    let (opcode, opcode_bits) = Gen2CommandType::MarginRead.opcode();
    let total_bits = opcode_bits + 2 + get_ebv_bit_len(args.bit_pointer) + 8 + mask.len();

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.bit_pointer)?
        .put(u32::from(args.bit_length), 8)?
        .put_span(mask)?;
    w.finish()
}

pub fn decode_margin_read(encoded: &BitSpan) -> Result<MarginReadCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::MarginRead)?;
    let memory_bank = MemoryBank::try_from(r.get(2)? as u8)?;
    let bit_pointer = r.get_ebv()?;
    let bit_length = r.get(8)? as u8;
    let mask = r.get_span(r.remaining())?;
    Ok(MarginReadCommandArgs {
        memory_bank,
        bit_pointer,
        bit_length,
        mask: Some(mask),
    })
}
