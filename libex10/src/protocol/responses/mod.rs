// libex10-rs/libex10/src/protocol/responses/mod.rs

//! Gen2 reply decoding.
//!
//! The device reports each air transaction as a `Gen2Transaction` event
//! packet. Reply bits are delivered pre-packed into big-endian 16-bit words;
//! the last word may carry padding that callers mask off using `num_bits`.

use log::{error, info};

use crate::fifo::packet::{EventFifoPacket, PacketData};
use crate::macros::wire_enum;
use crate::protocol::commands::Gen2CommandType;
use crate::types::bytes_for_bits;
use crate::{Error, Result};

wire_enum! {
    /// Error code a tag returns behind a set header bit.
    pub enum TagErrorCode {
        Other = 0x00,
        NotSupported = 0x01,
        InsufficientPrivileges = 0x02,
        MemoryOverrun = 0x03,
        MemoryLocked = 0x04,
        CryptoSuite = 0x05,
        CommandNotEncapsulated = 0x06,
        ResponseBufferOverflow = 0x07,
        SecurityTimeout = 0x08,
        InsufficientPower = 0x0B,
        NonSpecific = 0x0F,
        NoError = 0x10,
    }
}

wire_enum! {
    /// Device side outcome of a Gen2 transaction.
    pub enum Gen2TransactionStatus {
        Ok = 1,
        BadCrc = 2,
        NoReply = 3,
        InvalidReplyType = 4,
        CoverCodeFailed = 5,
        MemoryParityErr = 6,
        Unsupported = 7,
        Unknown = 255,
    }
}

/// Decoded tag reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gen2Reply {
    pub reply: Gen2CommandType,
    pub transaction_status: Gen2TransactionStatus,
    pub error_code: TagErrorCode,
    /// Reply bits (error header excluded).
    pub num_bits: u16,
    pub data: Vec<u16>,
}

/// Whether the reply to `command` starts with the one-bit error header.
pub fn reply_has_error_header(command: Gen2CommandType) -> Result<bool> {
    match command {
        Gen2CommandType::Read
        | Gen2CommandType::MarginRead
        | Gen2CommandType::BlockPermalock
        | Gen2CommandType::Write
        | Gen2CommandType::Kill2
        | Gen2CommandType::Lock
        | Gen2CommandType::BlockWrite => Ok(true),
        Gen2CommandType::Authenticate | Gen2CommandType::Kill1 | Gen2CommandType::Access => {
            Ok(false)
        }
        Gen2CommandType::Select => Err(Error::BadParamValue(
            "select has no tag reply to decode".to_string(),
        )),
    }
}

/// Split the bytes holding `num_bits` of reply data into big-endian words.
/// An odd final byte becomes the high byte of a zero-padded word; nothing
/// past `bytes_for_bits(num_bits)` is read.
fn general_reply_decode(num_bits: u16, data: &[u8]) -> Result<Vec<u16>> {
    let used = data.get(..bytes_for_bits(usize::from(num_bits))).ok_or_else(|| {
        Error::BadGen2Reply(format!(
            "{} reply bits but only {} bytes of data",
            num_bits,
            data.len()
        ))
    })?;
    Ok(used
        .chunks(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
        .collect())
}

/// Decode the tag reply carried by a `Gen2Transaction` event packet.
///
/// A tag-reported error stops the decode and surfaces as
/// `Error::TagError`; a failed transaction surfaces as
/// `Error::Gen2TransactionStatus`.
pub fn decode_reply(command: Gen2CommandType, packet: &EventFifoPacket) -> Result<Gen2Reply> {
    let txn = match packet.data()? {
        PacketData::Gen2Transaction(txn) => txn,
        other => {
            return Err(Error::BadParamValue(format!(
                "expected a Gen2Transaction packet, got {:?}",
                other.packet_type()
            )));
        }
    };
    let dynamic = &packet.dynamic_data;

    let status = Gen2TransactionStatus::try_from(txn.status).unwrap_or(Gen2TransactionStatus::Unknown);
    if status != Gen2TransactionStatus::Ok {
        error!("gen2 transaction for {} failed: {}", command, status);
        return Err(Error::Gen2TransactionStatus(status));
    }

    let has_header = reply_has_error_header(command).inspect_err(|_| {
        error!("no known reply decoder for command {}", command);
    })?;

    let mut num_bits = txn.num_bits;
    let mut data = dynamic.as_slice();
    if has_header {
        // header bit plus at least one byte of either error code or data
        if num_bits < 9 {
            error!("expected at least 9 reply bits, received {}", num_bits);
            return Err(Error::BadGen2Reply(format!(
                "reply of {} bits is shorter than the error header",
                num_bits
            )));
        }
        let header = dynamic
            .first()
            .ok_or_else(|| Error::BadGen2Reply("reply has no data".to_string()))?;
        if header & 0x01 != 0 {
            let raw = dynamic
                .get(1)
                .copied()
                .ok_or_else(|| Error::BadGen2Reply("error header without code".to_string()))?;
            let code = TagErrorCode::try_from(raw).unwrap_or(TagErrorCode::NonSpecific);
            if code != TagErrorCode::NoError {
                error!("tag reported error: {}", code);
                return Err(Error::TagError(code));
            }
        }
        num_bits -= 1;
        data = &dynamic[1..];
    }

    if command == Gen2CommandType::Authenticate {
        // in-process reply: the barker code is reported with the data
        num_bits += 7;
    }

    let words = general_reply_decode(num_bits, data)?;

    Ok(Gen2Reply {
        reply: command,
        transaction_status: status,
        error_code: TagErrorCode::NoError,
        num_bits,
        data: words,
    })
}

/// Log and report whether `reply` carries a tag error.
pub fn check_error(reply: &Gen2Reply) -> bool {
    if reply.error_code == TagErrorCode::NoError {
        return false;
    }
    error!("Gen2Transaction error:");
    error!("    Reply command: {}", reply.reply);
    error!(
        "    TagErrorCode: {} ({})",
        reply.error_code, reply.error_code as u8
    );
    if reply.reply == Gen2CommandType::Read {
        if let Some(first) = reply.data.first() {
            error!("    data[0]: {:#06x}", first);
        }
    }
    true
}

/// Log a decoded reply.
pub fn print_reply(reply: &Gen2Reply) {
    info!(
        "Gen2Reply: command: ({}) {}",
        reply.reply as u8, reply.reply
    );
    info!(
        "           status: ({}) {}",
        reply.transaction_status as u8, reply.transaction_status
    );
    info!(
        "           error code: ({}) {}",
        reply.error_code as u8, reply.error_code
    );
    if reply.reply == Gen2CommandType::Read {
        if let Some(first) = reply.data.first() {
            info!("           data[0]: {:#06X}", first);
        }
    }
}
