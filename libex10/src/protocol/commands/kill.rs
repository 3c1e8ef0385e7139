// libex10-rs/libex10/src/protocol/commands/kill.rs

use super::{Gen2CommandType, command_reader, command_writer};
use crate::types::BitSpan;
use crate::Result;

/// Half of the kill password; the two halves go out as Kill1 then Kill2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KillCommandArgs {
    pub password: u16,
}

/// Encode a Kill (opcode 0xC4) with zeroed RFU/recom bits.
pub fn encode_kill(args: &KillCommandArgs) -> Result<BitSpan> {
    let (opcode, opcode_bits) = Gen2CommandType::Kill1.opcode();
    let total_bits = opcode_bits + 16 + 3;

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(u32::from(args.password), 16)?
        .put(0, 3)?;
    w.finish()
}

pub fn decode_kill(encoded: &BitSpan) -> Result<KillCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Kill1)?;
    let password = r.get(16)? as u16;
    r.get(3)?;
    Ok(KillCommandArgs { password })
}
