// libex10-rs/libex10/src/protocol/commands/read.rs

use super::{Gen2CommandType, MemoryBank, command_reader, command_writer};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadCommandArgs {
    pub memory_bank: MemoryBank,
    pub word_pointer: u32,
    /// Words to read; 0 reads the whole bank.
    pub word_count: u8,
}

/// Encode a Read (opcode 0xC2).
pub fn encode_read(args: &ReadCommandArgs) -> Result<BitSpan> {
    let (opcode, opcode_bits) = Gen2CommandType::Read.opcode();
    let total_bits = opcode_bits + 2 + get_ebv_bit_len(args.word_pointer) + 8;

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.word_pointer)?
        .put(u32::from(args.word_count), 8)?;
    w.finish()
}

pub fn decode_read(encoded: &BitSpan) -> Result<ReadCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Read)?;
    Ok(ReadCommandArgs {
        memory_bank: MemoryBank::try_from(r.get(2)? as u8)?,
        word_pointer: r.get_ebv()?,
        word_count: r.get(8)? as u8,
    })
}
