// libex10-rs/libex10/src/error.rs

use thiserror::Error;

use crate::protocol::responses::{Gen2TransactionStatus, TagErrorCode};

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("missing argument: {0}")]
    NullPointer(&'static str),

    #[error("invalid parameter value: {0}")]
    BadParamValue(String),

    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("aggregate op buffer overflow: need {required} bytes, {available} available")]
    AggBufferOverflow { required: usize, available: usize },

    #[error("gen2 tx buffer overflow: need {required} bytes, capacity {capacity}")]
    Gen2BufferLength { required: usize, capacity: usize },

    #[error("too many gen2 tx commands")]
    Gen2NumCommands,

    #[error("gen2 command encode failed: {0}")]
    Gen2CommandEncode(String),

    #[error("gen2 command decode failed: {0}")]
    Gen2CommandDecode(String),

    #[error("gen2 enable does not match command type at index {index}")]
    Gen2CommandEnableMismatch { index: usize },

    #[error("gen2 enable references empty command slot {index}")]
    Gen2EmptyCommand { index: usize },

    #[error("bad gen2 reply: {0}")]
    BadGen2Reply(String),

    #[error("gen2 transaction failed: {0}")]
    Gen2TransactionStatus(Gen2TransactionStatus),

    #[error("tag reported error: {0}")]
    TagError(TagErrorCode),

    #[error("invalid instruction {value:#04x} at offset {offset}")]
    InvalidInstruction { offset: usize, value: u8 },

    #[error("no instruction starts at index {index} (buffer length {length})")]
    InstructionIndex { index: usize, length: usize },

    #[error("no free event fifo buffers")]
    NoFreeBuffers,

    #[error("invalid event fifo packet: {0}")]
    InvalidEventPacket(String),

    #[error("host interface error: {0}")]
    HostInterface(String),

    #[error("operation timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Module identifiers carried in the `module` byte of a result record.
pub mod module {
    pub const PROTOCOL: u8 = 4;
    pub const UTILS: u8 = 6;
    pub const GEN2_COMMANDS: u8 = 12;
    pub const GEN2_RESPONSE: u8 = 13;
    pub const FIFO_BUFFER_LIST: u8 = 15;
}

/// SDK result codes as reported by the device-side result record.
pub mod result_code {
    pub const BAD_PARAM_VALUE: u8 = 1;
    pub const BAD_PARAM_LENGTH: u8 = 2;
    pub const NULL_POINTER: u8 = 4;
    pub const TIMEOUT: u8 = 5;
    pub const AGG_BUFFER_OVERFLOW: u8 = 7;
    pub const INVALID_STATE: u8 = 9;
    pub const NO_FREE_EVENT_FIFO_BUFFERS: u8 = 11;
    pub const INVALID_EVENT_FIFO_PACKET: u8 = 16;
    pub const HOST_INTERFACE: u8 = 18;
    pub const GEN2_BUFFER_LENGTH: u8 = 19;
    pub const GEN2_NUM_COMMANDS: u8 = 20;
    pub const GEN2_COMMAND_ENCODE: u8 = 21;
    pub const GEN2_COMMAND_DECODE: u8 = 22;
    pub const GEN2_COMMAND_ENABLE_MISMATCH: u8 = 23;
    pub const GEN2_EMPTY_COMMAND: u8 = 24;
    pub const BAD_GEN2_REPLY: u8 = 31;
}

/// The 8 byte result record: error flag, module, result code and a 32-bit
/// device status, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultRecord {
    pub error: bool,
    pub module: u8,
    pub result_code: u8,
    pub device_status: u32,
}

impl ResultRecord {
    pub const SIZE: usize = 8;

    pub fn success() -> Self {
        Self::default()
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let flags: u16 = if self.error { 0x0001 } else { 0 };
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&flags.to_le_bytes());
        out[2] = self.module;
        out[3] = self.result_code;
        out[4..8].copy_from_slice(&self.device_status.to_le_bytes());
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let flags = crate::protocol::parser::le_u16_at(data, 0)?;
        Ok(Self {
            error: flags & 0x0001 != 0,
            module: crate::protocol::parser::byte_at(data, 2)?,
            result_code: crate::protocol::parser::byte_at(data, 3)?,
            device_status: crate::protocol::parser::le_u32_at(data, 4)?,
        })
    }
}

impl Error {
    /// SDK numeric result code of this error.
    pub fn result_code(&self) -> u8 {
        self.to_result_record().result_code
    }

    /// Map the error onto the module / result code pair used in result
    /// records so it can travel through the event fifo.
    pub fn to_result_record(&self) -> ResultRecord {
        use result_code::*;
        let (module, code, device_status) = match self {
            Error::NullPointer(_) => (module::UTILS, NULL_POINTER, 0),
            Error::BadParamValue(_) => (module::UTILS, BAD_PARAM_VALUE, 0),
            Error::InvalidLength { .. } => (module::UTILS, BAD_PARAM_LENGTH, 0),
            Error::AggBufferOverflow { .. } => (module::UTILS, AGG_BUFFER_OVERFLOW, 0),
            Error::Gen2BufferLength { .. } => (module::GEN2_COMMANDS, GEN2_BUFFER_LENGTH, 0),
            Error::Gen2NumCommands => (module::GEN2_COMMANDS, GEN2_NUM_COMMANDS, 0),
            Error::Gen2CommandEncode(_) => (module::GEN2_COMMANDS, GEN2_COMMAND_ENCODE, 0),
            Error::Gen2CommandDecode(_) => (module::GEN2_COMMANDS, GEN2_COMMAND_DECODE, 0),
            Error::Gen2CommandEnableMismatch { .. } => {
                (module::GEN2_COMMANDS, GEN2_COMMAND_ENABLE_MISMATCH, 0)
            }
            Error::Gen2EmptyCommand { .. } => (module::GEN2_COMMANDS, GEN2_EMPTY_COMMAND, 0),
            Error::BadGen2Reply(_) => (module::GEN2_RESPONSE, BAD_GEN2_REPLY, 0),
            Error::Gen2TransactionStatus(status) => {
                (module::GEN2_RESPONSE, BAD_GEN2_REPLY, *status as u32)
            }
            Error::TagError(code) => (module::GEN2_RESPONSE, BAD_GEN2_REPLY, *code as u32),
            Error::InvalidInstruction { .. } | Error::InstructionIndex { .. } => {
                (module::UTILS, INVALID_STATE, 0)
            }
            Error::NoFreeBuffers => (module::FIFO_BUFFER_LIST, NO_FREE_EVENT_FIFO_BUFFERS, 0),
            Error::InvalidEventPacket(_) => (module::PROTOCOL, INVALID_EVENT_FIFO_PACKET, 0),
            Error::HostInterface(_) => (module::PROTOCOL, HOST_INTERFACE, 0),
            Error::Timeout => (module::PROTOCOL, TIMEOUT, 0),
        };
        ResultRecord {
            error: true,
            module,
            result_code: code,
            device_status,
        }
    }
}
