// libex10-rs/libex10/src/protocol/commands/mod.rs

pub mod access;
pub mod authenticate;
pub mod block_permalock;
pub mod block_write;
pub mod kill;
pub mod lock;
pub mod margin_read;
pub mod read;
pub mod select;
pub mod write;

pub use access::AccessCommandArgs;
pub use authenticate::AuthenticateCommandArgs;
pub use block_permalock::BlockPermalockCommandArgs;
pub use block_write::BlockWriteCommandArgs;
pub use kill::KillCommandArgs;
pub use lock::LockCommandArgs;
pub use margin_read::MarginReadCommandArgs;
pub use read::ReadCommandArgs;
pub use select::SelectCommandArgs;
pub use write::WriteCommandArgs;

use crate::constants::TX_COMMAND_ENCODE_BUFFER_SIZE;
use crate::macros::wire_enum;
use crate::protocol::bits::{BitReader, BitWriter};
use crate::protocol::txn_controls::{Gen2TxnControls, get_gen2_tx_control_config};
use crate::types::{BitSpan, bytes_for_bits};
use crate::{Error, Result};

wire_enum! {
    /// Gen2 command kinds, in device table order.
    pub enum Gen2CommandType {
        Select = 0,
        Read = 1,
        Write = 2,
        Kill1 = 3,
        Kill2 = 4,
        Lock = 5,
        Access = 6,
        BlockWrite = 7,
        BlockPermalock = 8,
        Authenticate = 9,
        MarginRead = 10,
    }
}

impl Gen2CommandType {
    /// Opcode and its width in bits as sent over the air.
    pub fn opcode(&self) -> (u32, usize) {
        match self {
            Self::Select => (0xA, 4),
            Self::Read => (0xC2, 8),
            Self::Write => (0xC3, 8),
            Self::Kill1 | Self::Kill2 => (0xC4, 8),
            Self::Lock => (0xC5, 8),
            Self::Access => (0xC6, 8),
            Self::BlockWrite => (0xC7, 8),
            Self::BlockPermalock => (0xC9, 8),
            Self::Authenticate => (0xD5, 8),
            Self::MarginRead => (0xE001, 16),
        }
    }
}

wire_enum! {
    /// Inventoried flag or SL flag a Select modifies.
    pub enum SelectTarget {
        Session0 = 0,
        Session1 = 1,
        Session2 = 2,
        Session3 = 3,
        SelectedFlag = 4,
    }
}

wire_enum! {
    /// Select action, numbered as in the Gen2 action table.
    pub enum SelectAction {
        Action000 = 0,
        Action001 = 1,
        Action010 = 2,
        Action011 = 3,
        Action100 = 4,
        Action101 = 5,
        Action110 = 6,
        Action111 = 7,
    }
}

wire_enum! {
    pub enum SelectMemoryBank {
        FileType = 0,
        Epc = 1,
        Tid = 2,
        File0 = 3,
    }
}

wire_enum! {
    /// Tag memory bank of an access command.
    pub enum MemoryBank {
        Reserved = 0,
        Epc = 1,
        Tid = 2,
        User = 3,
    }
}

wire_enum! {
    /// Whether a BlockPermalock reads or sets the permalock bits.
    pub enum BlockPermalockReadLock {
        Read = 0,
        Permalock = 1,
    }
}

/// A Gen2 command together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gen2Command {
    Select(SelectCommandArgs),
    Read(ReadCommandArgs),
    Write(WriteCommandArgs),
    /// Kill, first (password-half) exchange.
    Kill1(KillCommandArgs),
    /// Kill, second exchange. Encodes identically to `Kill1`.
    Kill2(KillCommandArgs),
    Lock(LockCommandArgs),
    Access(AccessCommandArgs),
    BlockWrite(BlockWriteCommandArgs),
    BlockPermalock(BlockPermalockCommandArgs),
    Authenticate(AuthenticateCommandArgs),
    MarginRead(MarginReadCommandArgs),
}

impl Gen2Command {
    /// Kind of this command.
    pub fn command_type(&self) -> Gen2CommandType {
        match self {
            Self::Select(_) => Gen2CommandType::Select,
            Self::Read(_) => Gen2CommandType::Read,
            Self::Write(_) => Gen2CommandType::Write,
            Self::Kill1(_) => Gen2CommandType::Kill1,
            Self::Kill2(_) => Gen2CommandType::Kill2,
            Self::Lock(_) => Gen2CommandType::Lock,
            Self::Access(_) => Gen2CommandType::Access,
            Self::BlockWrite(_) => Gen2CommandType::BlockWrite,
            Self::BlockPermalock(_) => Gen2CommandType::BlockPermalock,
            Self::Authenticate(_) => Gen2CommandType::Authenticate,
            Self::MarginRead(_) => Gen2CommandType::MarginRead,
        }
    }

    /// Encode into the over-the-air bit stream.
    pub fn encode(&self) -> Result<BitSpan> {
        let encoded = match self {
            Self::Select(args) => select::encode_select(args),
            Self::Read(args) => read::encode_read(args),
            Self::Write(args) => write::encode_write(args),
            Self::Kill1(args) | Self::Kill2(args) => kill::encode_kill(args),
            Self::Lock(args) => lock::encode_lock(args),
            Self::Access(args) => access::encode_access(args),
            Self::BlockWrite(args) => block_write::encode_block_write(args),
            Self::BlockPermalock(args) => block_permalock::encode_block_permalock(args),
            Self::Authenticate(args) => authenticate::encode_authenticate(args),
            Self::MarginRead(args) => margin_read::encode_margin_read(args),
        };
        encoded.map_err(encode_failure)
    }

    /// Decode an encoded command. A Kill opcode always decodes as `Kill1`.
    pub fn decode(encoded: &BitSpan) -> Result<Self> {
        let command = match decode_command_type(encoded)? {
            Gen2CommandType::Select => Self::Select(select::decode_select(encoded)?),
            Gen2CommandType::Read => Self::Read(read::decode_read(encoded)?),
            Gen2CommandType::Write => Self::Write(write::decode_write(encoded)?),
            Gen2CommandType::Kill1 | Gen2CommandType::Kill2 => {
                Self::Kill1(kill::decode_kill(encoded)?)
            }
            Gen2CommandType::Lock => Self::Lock(lock::decode_lock(encoded)?),
            Gen2CommandType::Access => Self::Access(access::decode_access(encoded)?),
            Gen2CommandType::BlockWrite => {
                Self::BlockWrite(block_write::decode_block_write(encoded)?)
            }
            Gen2CommandType::BlockPermalock => {
                Self::BlockPermalock(block_permalock::decode_block_permalock(encoded)?)
            }
            Gen2CommandType::Authenticate => {
                Self::Authenticate(authenticate::decode_authenticate(encoded)?)
            }
            Gen2CommandType::MarginRead => {
                Self::MarginRead(margin_read::decode_margin_read(encoded)?)
            }
        };
        Ok(command)
    }

    /// Device transaction controls for this command.
    pub fn tx_control_config(&self) -> Gen2TxnControls {
        get_gen2_tx_control_config(self)
    }
}

/// Identify the command from its leading opcode bits.
pub fn decode_command_type(encoded: &BitSpan) -> Result<Gen2CommandType> {
    let data = encoded.as_bytes();
    let first = *data
        .first()
        .ok_or(Error::NullPointer("encoded command is empty"))?;

    if first >> 4 == 0xA {
        return Ok(Gen2CommandType::Select);
    }
    let command = match first {
        0xC2 => Gen2CommandType::Read,
        0xC3 => Gen2CommandType::Write,
        0xC4 => Gen2CommandType::Kill1,
        0xC5 => Gen2CommandType::Lock,
        0xC6 => Gen2CommandType::Access,
        0xC7 => Gen2CommandType::BlockWrite,
        0xC9 => Gen2CommandType::BlockPermalock,
        0xD5 => Gen2CommandType::Authenticate,
        _ => {
            let second = data.get(1).copied().unwrap_or(0);
            match u16::from_be_bytes([first, second]) {
                0xE001 => Gen2CommandType::MarginRead,
                other => {
                    return Err(Error::BadParamValue(format!(
                        "unknown gen2 opcode {:#06x}",
                        other
                    )));
                }
            }
        }
    };
    Ok(command)
}

/// Resolve an optional variable length field, failing the encode when it is
/// absent.
pub(crate) fn required_span<'a>(
    span: &'a Option<BitSpan>,
    field: &'static str,
) -> Result<&'a BitSpan> {
    span.as_ref()
        .ok_or_else(|| Error::Gen2CommandEncode(format!("{} is missing", field)))
}

/// Writer sized for `total_bits`, refusing commands that exceed the encode
/// buffer.
pub(crate) fn command_writer(total_bits: usize) -> Result<BitWriter> {
    if bytes_for_bits(total_bits) > TX_COMMAND_ENCODE_BUFFER_SIZE {
        return Err(Error::Gen2CommandEncode(format!(
            "{} bits exceed the {} byte encode buffer",
            total_bits, TX_COMMAND_ENCODE_BUFFER_SIZE
        )));
    }
    Ok(BitWriter::with_bit_len(total_bits))
}

/// Reader positioned after the opcode of `command`.
pub(crate) fn command_reader(
    encoded: &BitSpan,
    command: Gen2CommandType,
) -> Result<BitReader<'_>> {
    let (_, opcode_bits) = command.opcode();
    let mut reader = BitReader::new(encoded);
    reader.get(opcode_bits)?;
    Ok(reader)
}

/// Map any encode failure onto `Gen2CommandEncode`.
pub(crate) fn encode_failure(err: Error) -> Error {
    match err {
        Error::Gen2CommandEncode(_) => err,
        other => Error::Gen2CommandEncode(other.to_string()),
    }
}
