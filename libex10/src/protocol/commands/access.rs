// libex10-rs/libex10/src/protocol/commands/access.rs

use super::{Gen2CommandType, command_reader, command_writer};
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessCommandArgs {
    pub password: u16,
}

/// Encode an Access (opcode 0xC6).
pub fn encode_access(args: &AccessCommandArgs) -> Result<BitSpan> {
    let (opcode, opcode_bits) = Gen2CommandType::Access.opcode();
    let mut w = command_writer(opcode_bits + 16)?;
    w.put(opcode, opcode_bits)?.put(u32::from(args.password), 16)?;
    w.finish()
}

pub fn decode_access(encoded: &BitSpan) -> Result<AccessCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Access)?;
    Ok(AccessCommandArgs {
        password: r.get(16)? as u16,
    })
}
