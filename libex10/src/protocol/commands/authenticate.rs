// libex10-rs/libex10/src/protocol/commands/authenticate.rs

use super::{Gen2CommandType, command_reader, command_writer, required_span};
use crate::types::BitSpan;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthenticateCommandArgs {
    pub send_rep: bool,
    pub inc_rep_len: bool,
    pub csi: u8,
    /// Message length in bits (12-bit field).
    pub length: u16,
    pub message: Option<BitSpan>,
    /// Expected bits in the tag response when `send_rep` is set. Only used
    /// to size the reply; never sent and not recovered by decode.
    pub rep_len_bits: u16,
}

/// Encode an Authenticate (opcode 0xD5).
pub fn encode_authenticate(args: &AuthenticateCommandArgs) -> Result<BitSpan> {
    let message = required_span(&args.message, "authenticate message")?;
    let (opcode, opcode_bits) = Gen2CommandType::Authenticate.opcode();
    let total_bits = opcode_bits + 2 + 1 + 1 + 8 + 12 + message.len();

    let mut w = command_writer(total_bits)?;
    w.put(opcode, opcode_bits)?
        .put(0, 2)?
        .put_bool(args.send_rep)?
        .put_bool(args.inc_rep_len)?
        .put(u32::from(args.csi), 8)?
        .put(u32::from(args.length), 12)?
        .put_span(message)?;
    w.finish()
}

pub fn decode_authenticate(encoded: &BitSpan) -> Result<AuthenticateCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Authenticate)?;
    r.get(2)?;
    let send_rep = r.get_bool()?;
    let inc_rep_len = r.get_bool()?;
    let csi = r.get(8)? as u8;
    let length = r.get(12)? as u16;
    let message = r.get_span(r.remaining())?;
    Ok(AuthenticateCommandArgs {
        send_rep,
        inc_rep_len,
        csi,
        length,
        message: Some(message),
        rep_len_bits: 0,
    })
}
