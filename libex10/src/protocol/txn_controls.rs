// libex10-rs/libex10/src/protocol/txn_controls.rs

use crate::macros::wire_enum;
use crate::protocol::commands::{BlockPermalockReadLock, Gen2Command, Gen2CommandType};
use crate::protocol::parser::{byte_at, le_u16_at};
use crate::Result;

wire_enum! {
    /// How the tag is expected to reply.
    pub enum ResponseType {
        None = 0,
        Immediate = 1,
        Delayed = 2,
        InProcess = 3,
    }
}

/// Per-command device transaction controls (one `Gen2TxnControls` register
/// entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gen2TxnControls {
    pub response_type: ResponseType,
    pub has_header_bit: bool,
    pub use_cover_code: bool,
    pub append_handle: bool,
    pub append_crc16: bool,
    pub is_kill_command: bool,
    /// Expected reply length in bits.
    pub rx_length: u16,
}

impl Default for Gen2TxnControls {
    /// The all-zero entry written for unused slots.
    fn default() -> Self {
        Self {
            response_type: ResponseType::None,
            has_header_bit: false,
            use_cover_code: false,
            append_handle: false,
            append_crc16: false,
            is_kill_command: false,
            rx_length: 0,
        }
    }
}

impl Gen2TxnControls {
    /// Bytes per register entry.
    pub const SIZE: usize = 4;

    /// Register entry image.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let flags = (self.response_type as u8 & 0x07)
            | u8::from(self.has_header_bit) << 3
            | u8::from(self.use_cover_code) << 4
            | u8::from(self.append_handle) << 5
            | u8::from(self.append_crc16) << 6
            | u8::from(self.is_kill_command) << 7;
        let rx = self.rx_length.to_le_bytes();
        [flags, 0, rx[0], rx[1]]
    }

    /// Parse one register entry.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let flags = byte_at(data, 0)?;
        Ok(Self {
            response_type: ResponseType::try_from(flags & 0x07)?,
            has_header_bit: flags & 0x08 != 0,
            use_cover_code: flags & 0x10 != 0,
            append_handle: flags & 0x20 != 0,
            append_crc16: flags & 0x40 != 0,
            is_kill_command: flags & 0x80 != 0,
            rx_length: le_u16_at(data, 2)?,
        })
    }
}

const fn controls(
    response_type: ResponseType,
    has_header_bit: bool,
    use_cover_code: bool,
    is_kill_command: bool,
    rx_length: u16,
) -> Gen2TxnControls {
    Gen2TxnControls {
        response_type,
        has_header_bit,
        use_cover_code,
        append_handle: true,
        append_crc16: true,
        is_kill_command,
        rx_length,
    }
}

/// Base controls per command type, before argument-dependent adjustment.
pub fn base_tx_control_config(command: Gen2CommandType) -> Gen2TxnControls {
    use ResponseType::*;
    match command {
        Gen2CommandType::Select => Gen2TxnControls {
            append_crc16: true,
            ..Gen2TxnControls::default()
        },
        Gen2CommandType::Read => controls(Immediate, true, false, false, 33),
        Gen2CommandType::Write => controls(Delayed, true, true, false, 33),
        Gen2CommandType::Kill1 => controls(Immediate, false, false, true, 32),
        Gen2CommandType::Kill2 => controls(Delayed, true, false, true, 33),
        Gen2CommandType::Lock => controls(Delayed, true, false, false, 33),
        Gen2CommandType::Access => controls(Immediate, false, true, false, 32),
        Gen2CommandType::BlockWrite => controls(Delayed, true, false, false, 33),
        Gen2CommandType::BlockPermalock => controls(Delayed, true, false, false, 33),
        Gen2CommandType::Authenticate => controls(InProcess, false, false, false, 41),
        Gen2CommandType::MarginRead => controls(Immediate, true, false, false, 33),
    }
}

/// Transaction controls for `command`, with the reply length adjusted for
/// commands whose reply size depends on their arguments.
pub fn get_gen2_tx_control_config(command: &Gen2Command) -> Gen2TxnControls {
    let mut config = base_tx_control_config(command.command_type());
    match command {
        Gen2Command::Read(args) => {
            config.rx_length += u16::from(args.word_count) * 16;
        }
        Gen2Command::BlockPermalock(args) => match args.read_lock {
            BlockPermalockReadLock::Read => {
                config.rx_length += u16::from(args.block_range) * 16;
                config.response_type = ResponseType::Immediate;
            }
            BlockPermalockReadLock::Permalock => {
                config.response_type = ResponseType::Delayed;
            }
        },
        Gen2Command::Authenticate(args) if args.send_rep => {
            config.rx_length = config.rx_length.wrapping_add(args.rep_len_bits);
            if args.inc_rep_len {
                config.rx_length = config.rx_length.wrapping_add(16);
            }
        }
        Gen2Command::Kill1(_) | Gen2Command::Kill2(_) => {
            config.is_kill_command = true;
        }
        _ => {}
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::*;
    use crate::types::BitSpan;

    #[test]
    fn read_rx_length_scales_with_words() {
        let cmd = Gen2Command::Read(ReadCommandArgs {
            memory_bank: MemoryBank::Tid,
            word_pointer: 0,
            word_count: 4,
        });
        let c = get_gen2_tx_control_config(&cmd);
        assert_eq!(c.rx_length, 33 + 64);
        assert_eq!(c.response_type, ResponseType::Immediate);
        assert!(c.has_header_bit);
        assert!(c.append_handle);
    }

    #[test]
    fn block_permalock_modes() {
        let mut args = BlockPermalockCommandArgs {
            read_lock: BlockPermalockReadLock::Read,
            memory_bank: MemoryBank::User,
            block_pointer: 0,
            block_range: 2,
            mask: Some(BitSpan::empty()),
        };
        let read = get_gen2_tx_control_config(&Gen2Command::BlockPermalock(args.clone()));
        assert_eq!(read.response_type, ResponseType::Immediate);
        assert_eq!(read.rx_length, 33 + 32);

        args.read_lock = BlockPermalockReadLock::Permalock;
        let lock = get_gen2_tx_control_config(&Gen2Command::BlockPermalock(args));
        assert_eq!(lock.response_type, ResponseType::Delayed);
        assert_eq!(lock.rx_length, 33);
    }

    #[test]
    fn authenticate_reply_length() {
        let args = AuthenticateCommandArgs {
            send_rep: true,
            inc_rep_len: true,
            csi: 0,
            length: 0,
            message: Some(BitSpan::empty()),
            rep_len_bits: 64,
        };
        let c = get_gen2_tx_control_config(&Gen2Command::Authenticate(args));
        assert_eq!(c.rx_length, 41 + 64 + 16);
        assert_eq!(c.response_type, ResponseType::InProcess);
    }

    #[test]
    fn kill_sets_kill_flag() {
        let c = get_gen2_tx_control_config(&Gen2Command::Kill1(KillCommandArgs { password: 1 }));
        assert!(c.is_kill_command);
        assert_eq!(c.rx_length, 32);
    }

    #[test]
    fn register_image() {
        let c = base_tx_control_config(Gen2CommandType::Write);
        // delayed | header | cover | handle | crc
        assert_eq!(c.to_bytes(), [0x7A, 0x00, 33, 0x00]);
        assert_eq!(Gen2TxnControls::from_bytes(&c.to_bytes()).unwrap(), c);

        let select = base_tx_control_config(Gen2CommandType::Select);
        assert_eq!(select.to_bytes(), [0x40, 0, 0, 0]);
    }
}
