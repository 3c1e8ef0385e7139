// libex10-rs/libex10/src/tx_command/mod.rs

//! Local table of Gen2 commands and its mirror in the device registers.
//!
//! The device holds up to [`MAX_TX_COMMAND_COUNT`] commands in one transmit
//! buffer, described by four parallel per-slot registers (offset, bit
//! length, transaction id, transaction controls). Three enable masks pick
//! which slots are sent as Selects, as halted access commands, or as auto
//! access commands during inventory.

use log::{error, info, warn};

use crate::constants::{GEN2_TX_BUFFER_REG_LENGTH, MAX_TX_COMMAND_COUNT, TX_COMMAND_ENCODE_BUFFER_SIZE};
use crate::protocol::commands::{Gen2Command, Gen2CommandType};
use crate::protocol::parser::{byte_at, le_u16_at, slice_at};
use crate::protocol::txn_controls::Gen2TxnControls;
use crate::registers::{
    RegisterInfo, GEN2_ACCESS_ENABLE, GEN2_AUTO_ACCESS_ENABLE, GEN2_LENGTHS, GEN2_OFFSETS,
    GEN2_SELECT_ENABLE, GEN2_TRANSACTION_IDS, GEN2_TXN_CONTROLS, GEN2_TX_BUFFER,
};
use crate::transport::RegisterTransport;
use crate::types::{bytes_for_bits, BitSpan};
use crate::utils::{bytes_to_hex_spaced, hex_dump_lines};
use crate::{Error, Result};

/// One slot of the local command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxCommandInfo {
    pub encoded: BitSpan,
    pub decoded: Option<Gen2Command>,
    pub valid: bool,
    /// Caller chosen tag echoed in the Gen2Transaction packet. Need not be
    /// unique or ordered.
    pub transaction_id: u8,
}

impl TxCommandInfo {
    fn command_type(&self) -> Option<Gen2CommandType> {
        self.decoded.as_ref().map(Gen2Command::command_type)
    }
}

/// Which enable register a mask is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnableClass {
    Select,
    Halted,
    AutoAccess,
}

impl EnableClass {
    fn register(self) -> &'static RegisterInfo {
        match self {
            Self::Select => &GEN2_SELECT_ENABLE,
            Self::Halted => &GEN2_ACCESS_ENABLE,
            Self::AutoAccess => &GEN2_AUTO_ACCESS_ENABLE,
        }
    }

    /// Select slots go to the select mask, everything else to the others.
    fn accepts(self, command: Option<Gen2CommandType>) -> bool {
        let is_select = command == Some(Gen2CommandType::Select);
        match self {
            Self::Select => is_select,
            Self::Halted | Self::AutoAccess => !is_select,
        }
    }
}

/// Gen2 transmit command manager.
#[derive(Debug, Clone)]
pub struct TxCommandManager {
    commands: [TxCommandInfo; MAX_TX_COMMAND_COUNT],
}

impl Default for TxCommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TxCommandManager {
    /// Manager with every slot empty.
    pub fn new() -> Self {
        Self {
            commands: std::array::from_fn(|_| TxCommandInfo::default()),
        }
    }

    /// All slots, valid or not, in slot order.
    pub fn get_local_sequence(&self) -> &[TxCommandInfo] {
        &self.commands
    }

    /// Invalidate every local slot. The device is not touched.
    pub fn clear_local_sequence(&mut self) {
        for command in &mut self.commands {
            command.valid = false;
        }
    }

    /// Invalidate slot `index`. Returns the index.
    pub fn clear_command_in_local_sequence(&mut self, index: usize) -> Result<usize> {
        let command = self.commands.get_mut(index).ok_or(Error::Gen2NumCommands)?;
        command.valid = false;
        Ok(index)
    }

    fn first_free_slot(&self) -> Result<usize> {
        self.commands
            .iter()
            .position(|c| !c.valid)
            .ok_or(Error::Gen2NumCommands)
    }

    /// Encode `command` into the first free slot and return the slot index.
    pub fn encode_and_append_command(
        &mut self,
        command: &Gen2Command,
        transaction_id: u8,
    ) -> Result<usize> {
        let index = self.first_free_slot()?;
        let encoded = command.encode().map_err(|e| {
            error!("Command encode failed (transaction id = {})", transaction_id);
            e
        })?;
        if encoded.is_empty() || encoded.byte_len() > TX_COMMAND_ENCODE_BUFFER_SIZE {
            error!("Command encode failed (transaction id = {})", transaction_id);
            return Err(Error::Gen2CommandEncode(format!(
                "{} command encoded to {} bits",
                command.command_type(),
                encoded.len()
            )));
        }
        self.commands[index] = TxCommandInfo {
            encoded,
            decoded: Some(command.clone()),
            valid: true,
            transaction_id,
        };
        Ok(index)
    }

    /// Store an already encoded command in the first free slot. The command
    /// is decoded as well so its transaction controls can be derived.
    pub fn append_encoded_command(&mut self, encoded: &BitSpan, transaction_id: u8) -> Result<usize> {
        let index = self.first_free_slot()?;
        if encoded.byte_len() > TX_COMMAND_ENCODE_BUFFER_SIZE {
            return Err(Error::InvalidLength {
                expected: TX_COMMAND_ENCODE_BUFFER_SIZE,
                actual: encoded.byte_len(),
            });
        }
        let decoded = Gen2Command::decode(encoded).map_err(|e| {
            error!("Command decode failed (transaction id = {})", transaction_id);
            e
        })?;
        self.commands[index] = TxCommandInfo {
            encoded: encoded.clone(),
            decoded: Some(decoded),
            valid: true,
            transaction_id,
        };
        Ok(index)
    }

    /// Invalidate every device slot by zeroing the lengths, and clear the
    /// three enable masks.
    pub fn clear_sequence(&self, transport: &mut dyn RegisterTransport) -> Result<()> {
        transport.write(&GEN2_LENGTHS, &[0u8; MAX_TX_COMMAND_COUNT * 2])?;
        transport.write(&GEN2_ACCESS_ENABLE, &[0, 0])?;
        transport.write(&GEN2_SELECT_ENABLE, &[0, 0])?;
        transport.write(&GEN2_AUTO_ACCESS_ENABLE, &[0, 0])?;
        Ok(())
    }

    /// Pack the valid slots into the device transmit buffer, in slot order,
    /// and write the per-slot registers.
    pub fn write_sequence(&self, transport: &mut dyn RegisterTransport) -> Result<()> {
        let mut tx_buffer = [0u8; GEN2_TX_BUFFER_REG_LENGTH];
        let mut offsets = [0u8; MAX_TX_COMMAND_COUNT];
        let mut lengths = [0u8; MAX_TX_COMMAND_COUNT * 2];
        let mut ids = [0u8; MAX_TX_COMMAND_COUNT];
        let mut controls = [0u8; MAX_TX_COMMAND_COUNT * Gen2TxnControls::SIZE];

        let mut offset = 0usize;
        for (idx, command) in self.commands.iter().enumerate().filter(|(_, c)| c.valid) {
            let bits = command.encoded.len();
            let byte_size = bytes_for_bits(bits);
            if offset + byte_size > GEN2_TX_BUFFER_REG_LENGTH {
                error!(
                    "command {} needs bytes {}..{} of the {} byte tx buffer",
                    idx,
                    offset,
                    offset + byte_size,
                    GEN2_TX_BUFFER_REG_LENGTH
                );
                return Err(Error::Gen2BufferLength {
                    required: offset + byte_size,
                    capacity: GEN2_TX_BUFFER_REG_LENGTH,
                });
            }
            let bit_length = u16::try_from(bits)
                .map_err(|_| Error::Gen2CommandEncode(format!("{} bit command", bits)))?;

            offsets[idx] = offset as u8;
            lengths[idx * 2..idx * 2 + 2].copy_from_slice(&bit_length.to_le_bytes());
            ids[idx] = command.transaction_id;
            tx_buffer[offset..offset + byte_size]
                .copy_from_slice(&command.encoded.as_bytes()[..byte_size]);

            let control = command
                .decoded
                .as_ref()
                .map(Gen2Command::tx_control_config)
                .unwrap_or_default();
            let at = idx * Gen2TxnControls::SIZE;
            controls[at..at + Gen2TxnControls::SIZE].copy_from_slice(&control.to_bytes());

            offset += byte_size;
        }

        transport.write_multiple(&[
            (GEN2_OFFSETS, &offsets[..]),
            (GEN2_LENGTHS, &lengths[..]),
            (GEN2_TRANSACTION_IDS, &ids[..]),
            (GEN2_TXN_CONTROLS, &controls[..]),
        ])?;
        transport.write(&GEN2_TX_BUFFER, &tx_buffer)
    }

    /// Write the Select enable mask. Only Select slots belong here.
    pub fn write_select_enables(
        &self,
        enables: &[bool],
        transport: &mut dyn RegisterTransport,
    ) -> Result<()> {
        self.write_enables(EnableClass::Select, enables, transport)
    }

    /// Write the enable mask of access commands sent while a tag is halted.
    pub fn write_halted_enables(
        &self,
        enables: &[bool],
        transport: &mut dyn RegisterTransport,
    ) -> Result<()> {
        self.write_enables(EnableClass::Halted, enables, transport)
    }

    /// Write the enable mask of access commands sent after each inventoried tag.
    pub fn write_auto_access_enables(
        &self,
        enables: &[bool],
        transport: &mut dyn RegisterTransport,
    ) -> Result<()> {
        self.write_enables(EnableClass::AutoAccess, enables, transport)
    }

    /// Build and write one enable mask.
    ///
    /// Enabling an empty slot aborts before anything is written. Enabling a
    /// slot of the wrong command class still sets its bit; the mask is
    /// written and the first such slot is reported afterwards.
    fn write_enables(
        &self,
        class: EnableClass,
        enables: &[bool],
        transport: &mut dyn RegisterTransport,
    ) -> Result<()> {
        if enables.len() > MAX_TX_COMMAND_COUNT {
            return Err(Error::Gen2NumCommands);
        }

        let mut bits = 0u16;
        let mut mismatch = None;
        for (idx, _) in enables.iter().enumerate().filter(|(_, enabled)| **enabled) {
            let command = &self.commands[idx];
            if !command.valid {
                return Err(Error::Gen2EmptyCommand { index: idx });
            }
            if !class.accepts(command.command_type()) {
                warn!(
                    "NOTE: enabling a {:?} command at index {} in the {:?} enables",
                    command.command_type(),
                    idx,
                    class
                );
                mismatch.get_or_insert(idx);
            }
            bits |= 1 << idx;
        }

        transport.write(class.register(), &bits.to_le_bytes())?;
        match mismatch {
            Some(index) => Err(Error::Gen2CommandEnableMismatch { index }),
            None => Ok(()),
        }
    }

    /// Rebuild the local table from the device registers. A zero bit length
    /// marks an empty slot.
    pub fn read_device_to_local_sequence(&mut self, transport: &mut dyn RegisterTransport) -> Result<()> {
        let offsets = transport.read(&GEN2_OFFSETS)?;
        let lengths = transport.read(&GEN2_LENGTHS)?;
        let tx_buffer = transport.read(&GEN2_TX_BUFFER)?;

        for (idx, command) in self.commands.iter_mut().enumerate() {
            let bits = usize::from(le_u16_at(&lengths, idx * 2)?);
            if bits == 0 {
                command.valid = false;
                continue;
            }
            let offset = usize::from(byte_at(&offsets, idx)?);
            let data = slice_at(&tx_buffer, offset, bytes_for_bits(bits))?;
            let encoded = BitSpan::new(data.to_vec(), bits)?;
            let decoded = Gen2Command::decode(&encoded).map_err(|e| {
                error!(
                    "Command number index={}, offset={}, length={} has an invalid command type: {}",
                    idx, offset, bits, e
                );
                Error::Gen2CommandDecode(format!("slot {}: {}", idx, e))
            })?;
            command.encoded = encoded;
            command.decoded = Some(decoded);
            command.valid = true;
        }
        Ok(())
    }

    /// Log every valid slot.
    pub fn print_local_sequence(&self) {
        for (idx, command) in self.commands.iter().enumerate().filter(|(_, c)| c.valid) {
            info!(
                "[{}] command of length {} bits, transaction id {}",
                idx,
                command.encoded.len(),
                command.transaction_id
            );
            info!("  raw data: {}", command.encoded.to_hex());
            if let Some(decoded) = &command.decoded {
                info!("  command type is: {}", decoded.command_type());
            }
        }
    }

    /// Read back and log every Gen2 control register.
    pub fn dump_control_registers(&self, transport: &mut dyn RegisterTransport) -> Result<()> {
        let tx_buffer = transport.read(&GEN2_TX_BUFFER)?;
        let access = transport.read(&GEN2_ACCESS_ENABLE)?;
        let offsets = transport.read(&GEN2_OFFSETS)?;
        let lengths = transport.read(&GEN2_LENGTHS)?;
        let controls = transport.read(&GEN2_TXN_CONTROLS)?;

        info!("gen2_tx_buffer:");
        for line in hex_dump_lines(&tx_buffer) {
            info!("  {}", line);
        }
        info!("gen2_access_enable: {}", bytes_to_hex_spaced(&access));
        for idx in 0..MAX_TX_COMMAND_COUNT {
            info!("gen2_offsets[{}]: {}", idx, byte_at(&offsets, idx)?);
        }
        for idx in 0..MAX_TX_COMMAND_COUNT {
            info!("gen2_lengths[{}]: {}", idx, le_u16_at(&lengths, idx * 2)?);
        }
        for (idx, raw) in controls.chunks(Gen2TxnControls::SIZE).enumerate() {
            match Gen2TxnControls::from_bytes(raw) {
                Ok(c) => info!(
                    "gen2_txn_controls[{}]: response_type={}, has_header_bit={}, use_cover_code={}, append_handle={}, append_crc16={}, is_kill_command={}, rx_length={}",
                    idx,
                    c.response_type,
                    c.has_header_bit,
                    c.use_cover_code,
                    c.append_handle,
                    c.append_crc16,
                    c.is_kill_command,
                    c.rx_length
                ),
                Err(e) => info!("gen2_txn_controls[{}]: {} ({})", idx, bytes_to_hex_spaced(raw), e),
            }
        }
        Ok(())
    }
}
