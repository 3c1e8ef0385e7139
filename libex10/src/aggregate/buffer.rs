// libex10-rs/libex10/src/aggregate/buffer.rs

//! Host side image of the aggregate op buffer.

use log::{error, info, warn};

use crate::aggregate::instruction::{instruction_size, AggregateOpInstruction, InstructionType};
use crate::constants::{AGGREGATE_OP_BUFFER_REG_LENGTH, AGGREGATE_OP_INSTRUCTION_SIZE};
use crate::registers::{register_lookup_by_address, AGGREGATE_OP_BUFFER};
use crate::transport::RegisterTransport;
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// Counts gathered by [`print_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferSummary {
    pub instructions: usize,
    /// 0x00 padding bytes.
    pub reserved: usize,
    /// Bytes that are neither an instruction nor padding.
    pub invalid: usize,
}

/// Instructions appended so far, bounded by the device buffer size.
///
/// Appends are not transactional: a failed append leaves everything
/// appended before it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOpBuffer {
    data: Vec<u8>,
    capacity: usize,
}

impl Default for AggregateOpBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateOpBuffer {
    /// Buffer sized for the `AggregateOpBuffer` register.
    pub fn new() -> Self {
        Self::with_capacity(AGGREGATE_OP_BUFFER_REG_LENGTH)
    }

    /// Empty buffer for a device buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap bytes read back from the device for parsing.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            capacity: data.len().max(AGGREGATE_OP_BUFFER_REG_LENGTH),
        }
    }

    /// Encoded instructions.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes used.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every instruction from the local buffer.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append `instruction` if it fits.
    ///
    /// A GoToIndex must target the start of an instruction already in the
    /// buffer, or an index past the end (a later append), which only warns.
    pub fn append_instruction(&mut self, instruction: &AggregateOpInstruction) -> Result<()> {
        let size = instruction.size()?;

        if let AggregateOpInstruction::GoToIndex { jump_index, .. } = instruction {
            let jump_index = usize::from(*jump_index);
            if jump_index >= self.data.len() {
                warn!("Jumping to an instruction not yet in the buffer");
            } else if let Err(e) = self.get_instruction_from_index(jump_index) {
                error!("The index attempted to jump to is not a valid instruction");
                return Err(e);
            }
        }

        // the device keeps at least one byte free
        if self.data.len() + size >= self.capacity {
            return Err(Error::AggBufferOverflow {
                required: size,
                available: self.capacity - self.data.len(),
            });
        }

        let before = self.data.len();
        if let Err(e) = instruction.encode_into(&mut self.data) {
            self.data.truncate(before);
            return Err(e);
        }
        Ok(())
    }

    /// Find the instruction that starts at byte `index` by walking from the
    /// start. Returns the instruction and its ordinal.
    pub fn get_instruction_from_index(&self, index: usize) -> Result<(AggregateOpInstruction, usize)> {
        let data = &self.data;
        let mut idx = 0;
        let mut ordinal = 0;
        while idx < data.len() && idx != index {
            match instruction_size(&data[idx..]) {
                Ok(size) => idx += size,
                Err(_) => {
                    error!(
                        "Invalid instruction #{}: {:#04x} @ {:#06x}",
                        ordinal, data[idx], idx
                    );
                    return Err(Error::InvalidInstruction {
                        offset: idx,
                        value: data[idx],
                    });
                }
            }
            ordinal += 1;
        }

        if idx >= data.len() {
            error!("No instruction starts at {:#06x}; walked past instruction #{}", index, ordinal);
            return Err(Error::InstructionIndex {
                index,
                length: data.len(),
            });
        }

        let (instruction, _) = AggregateOpInstruction::decode(&data[idx..]).map_err(|e| match e {
            Error::InvalidInstruction { value, .. } => Error::InvalidInstruction { offset: idx, value },
            other => other,
        })?;
        Ok((instruction, ordinal))
    }

    pub fn print_buffer(&self) -> BufferSummary {
        print_buffer(&self.data)
    }

    /// Write the used bytes to the device buffer.
    pub fn set_buffer(&self, transport: &mut dyn RegisterTransport) -> Result<()> {
        let register_len = AGGREGATE_OP_BUFFER.total_len();
        if self.data.len() > register_len {
            return Err(Error::AggBufferOverflow {
                required: self.data.len(),
                available: register_len,
            });
        }
        transport.write_partial(AGGREGATE_OP_BUFFER.address, self.data.len() as u16, &self.data)
    }
}

/// Zero the whole device aggregate op buffer.
pub fn clear_buffer(transport: &mut dyn RegisterTransport) -> Result<()> {
    transport.write(&AGGREGATE_OP_BUFFER, &[0u8; AGGREGATE_OP_BUFFER_REG_LENGTH])
}

/// Log the instruction at the start of `data` and return its size, or 0
/// when `data` does not start with an instruction.
pub fn print_instruction(data: &[u8]) -> usize {
    let (instruction, size) = match AggregateOpInstruction::decode(data) {
        Ok(decoded) => decoded,
        Err(Error::InvalidLength { .. }) => {
            warn!("instruction truncated by the end of the buffer");
            return data.len();
        }
        Err(_) => return 0,
    };
    match instruction {
        AggregateOpInstruction::Write { address, data } => {
            let name = register_lookup_by_address(address).map_or("", |reg| reg.name);
            info!(
                "Write command - address: {:#06x} {}, length: {}",
                address,
                name,
                data.len()
            );
            info!("write data: {}", bytes_to_hex_spaced(&data));
        }
        AggregateOpInstruction::Reset { destination } => {
            info!("Reset command - location: {}", destination)
        }
        AggregateOpInstruction::InsertFifoEvent { trigger_irq, packet } => info!(
            "Insert Fifo command - trigger_irq: {}, packet length: {}",
            trigger_irq,
            packet.len()
        ),
        AggregateOpInstruction::RunOp { op_id } => info!("Run op id {:#04x}", op_id),
        AggregateOpInstruction::GoToIndex {
            jump_index,
            repeat_counter,
        } => info!("Goto index: {} (repeat {})", jump_index, repeat_counter),
        AggregateOpInstruction::Identifier(id) => info!("Update identifier: {:#06x}", id),
        AggregateOpInstruction::ExitInstruction => info!("Exit command"),
        AggregateOpInstruction::HostMutexOn => info!("Host Mutex On command"),
        AggregateOpInstruction::HostMutexOff => info!("Host Mutex Off command"),
        AggregateOpInstruction::Reserved => return 0,
    }
    size
}

/// Walk `data` logging each instruction. Bytes that do not start an
/// instruction are counted and skipped one at a time.
pub fn print_buffer(data: &[u8]) -> BufferSummary {
    #[cfg(feature = "diagnostics")]
    for line in crate::utils::hex_dump_lines(data) {
        log::debug!("{}", line);
    }

    let mut summary = BufferSummary::default();
    let mut idx = 0;
    while idx < data.len() {
        let code = data[idx];
        match InstructionType::try_from(code) {
            Ok(InstructionType::Reserved) => {
                summary.reserved += 1;
                idx += 1;
            }
            Ok(_) => {
                info!("Instruction #{} @ {:#06x}:", summary.instructions, idx);
                let size = match print_instruction(&data[idx..]) {
                    0 => {
                        error!("No matching command found");
                        AGGREGATE_OP_INSTRUCTION_SIZE
                    }
                    size => size,
                };
                idx += size;
                summary.instructions += 1;
            }
            Err(_) => {
                summary.invalid += 1;
                idx += 1;
            }
        }
    }
    info!("{} Reserved Instructions (0x00)", summary.reserved);
    info!("{} Invalid Instructions", summary.invalid);
    summary
}
