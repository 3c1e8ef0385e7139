// libex10-rs/libex10/src/protocol/commands/write.rs

use super::{Gen2CommandType, MemoryBank, command_reader, command_writer};
use crate::protocol::ebv::get_ebv_bit_len;
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteCommandArgs {
    pub memory_bank: MemoryBank,
    pub word_pointer: u32,
    pub data: u16,
}

/// Encode a Write (opcode 0xC3). Cover coding of `data` is applied by the
/// device.
pub fn encode_write(args: &WriteCommandArgs) -> Result<BitSpan> {
    let (opcode, opcode_bits) = Gen2CommandType::Write.opcode();
    let total_bits = opcode_bits + 2 + get_ebv_bit_len(args.word_pointer) + 16;

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(args.memory_bank as u32, 2)?
        .put_ebv(args.word_pointer)?
        .put(u32::from(args.data), 16)?;
    w.finish()
}

pub fn decode_write(encoded: &BitSpan) -> Result<WriteCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Write)?;
    Ok(WriteCommandArgs {
        memory_bank: MemoryBank::try_from(r.get(2)? as u8)?,
        word_pointer: r.get_ebv()?,
        data: r.get(16)? as u16,
    })
}
