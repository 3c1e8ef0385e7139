// libex10-rs/libex10/src/protocol/commands/block_permalock.rs

use super::{
    BlockPermalockReadLock, Gen2CommandType, MemoryBank, command_reader, command_writer,
    required_span,
};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockPermalockCommandArgs {
    pub read_lock: BlockPermalockReadLock,
    pub memory_bank: MemoryBank,
    pub block_pointer: u32,
    pub block_range: u8,
    /// Empty for the read variant.
    pub mask: Option<BitSpan>,
}

/// Encode a BlockPermalock (opcode 0xC9).
pub fn encode_block_permalock(args: &BlockPermalockCommandArgs) -> Result<BitSpan> {
    let mask = required_span(&args.mask, "block permalock mask")?;
    let (opcode, opcode_bits) = Gen2CommandType::BlockPermalock.opcode();
    let total_bits =
        opcode_bits + 8 + 1 + 2 + get_ebv_bit_len(args.block_pointer) + 8 + mask.len();

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(0, 8)?
        .put(args.read_lock as u32, 1)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.block_pointer)?
        .put(u32::from(args.block_range), 8)?
        .put_span(mask)?;
    w.finish()
}

pub fn decode_block_permalock(encoded: &BitSpan) -> Result<BlockPermalockCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::BlockPermalock)?;
    r.get(8)?;
    let read_lock = BlockPermalockReadLock::try_from(r.get(1)? as u8)?;
    let memory_bank = MemoryBank::try_from(r.get(2)? as u8)?;
    let block_pointer = r.get_ebv()?;
    let block_range = r.get(8)? as u8;
    let mask = r.get_span(r.remaining())?;
    Ok(BlockPermalockCommandArgs {
        read_lock,
        memory_bank,
        block_pointer,
        block_range,
        mask: Some(mask),
    })
}
