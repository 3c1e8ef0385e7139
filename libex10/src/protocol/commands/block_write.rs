// libex10-rs/libex10/src/protocol/commands/block_write.rs

use super::{Gen2CommandType, MemoryBank, command_reader, command_writer, required_span};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockWriteCommandArgs {
    pub memory_bank: MemoryBank,
    pub word_pointer: u32,
    pub word_count: u8,
    pub data: Option<BitSpan>,
}

/// Encode a BlockWrite (opcode 0xC7). The tag handle is appended by the
/// device, so the data field runs to the end of the command.
pub fn encode_block_write(args: &BlockWriteCommandArgs) -> Result<BitSpan> {
    let data = required_span(&args.data, "block write data")?;
    let (opcode, opcode_bits) = Gen2CommandType::BlockWrite.opcode();
    let total_bits = opcode_bits + 2 + get_ebv_bit_len(args.word_pointer) + 8 + data.len();

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.word_pointer)?
        .put(u32::from(args.word_count), 8)?
        .put_span(data)?;
    w.finish()
}

pub fn decode_block_write(encoded: &BitSpan) -> Result<BlockWriteCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::BlockWrite)?;
    let memory_bank = MemoryBank::try_from(r.get(2)? as u8)?;
    let word_pointer = r.get_ebv()?;
    let word_count = r.get(8)? as u8;
    let data = r.get_span(r.remaining())?;
    Ok(BlockWriteCommandArgs {
        memory_bank,
        word_pointer,
        word_count,
        data: Some(data),
    })
}
