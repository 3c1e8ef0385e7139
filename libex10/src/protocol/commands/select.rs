// libex10-rs/libex10/src/protocol/commands/select.rs

use super::{
    Gen2CommandType, SelectAction, SelectMemoryBank, SelectTarget, command_reader,
    command_writer, required_span,
};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectCommandArgs {
    pub target: SelectTarget,
    pub action: SelectAction,
    pub memory_bank: SelectMemoryBank,
    pub bit_pointer: u32,
    pub bit_count: u8,
    pub mask: Option<BitSpan>,
    pub truncate: bool,
}

/// Encode a Select (opcode 0xA, 4 bits).
pub fn encode_select(args: &SelectCommandArgs) -> Result<BitSpan> {
    let mask = required_span(&args.mask, "select mask")?;
    let (opcode, opcode_bits) = Gen2CommandType::Select.opcode();
    let total_bits =
        opcode_bits + 3 + 3 + 2 + get_ebv_bit_len(args.bit_pointer) + 8 + mask.len() + 1;

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(args.target as u32, 3)?
        .put(args.action as u32, 3)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.bit_pointer)?
        .put(u32::from(args.bit_count), 8)?
        .put_span(mask)?
        .put_bool(args.truncate)?;
    w.finish()
}

/// Decode a Select. The mask takes every bit between `bit_count` and the
/// trailing truncate bit.
pub fn decode_select(encoded: &BitSpan) -> Result<SelectCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Select)?;
    let target = SelectTarget::try_from(r.get(3)? as u8)?;
    let action = SelectAction::try_from(r.get(3)? as u8)?;
    let memory_bank = SelectMemoryBank::try_from(r.get(2)? as u8)?;
    let bit_pointer = r.get_ebv()?;
    let bit_count = r.get(8)? as u8;
    let mask_bits = r
        .remaining()
        .checked_sub(1)
        .ok_or_else(|| Error::Gen2CommandDecode("select is missing truncate".to_string()))?;
    let mask = r.get_span(mask_bits)?;
    let truncate = r.get_bool()?;

    Ok(SelectCommandArgs {
        target,
        action,
        memory_bank,
        bit_pointer,
        bit_count,
        mask: Some(mask),
        truncate,
    })
}
