// libex10-rs/libex10/src/aggregate/instruction.rs

//! Instructions understood by the device's aggregate op.
//!
//! Each instruction is a one byte type code followed by a fixed or
//! self-describing payload, all little-endian:
//!
//! | type | payload |
//! | --- | --- |
//! | Write | address u16, length u16, `length` data bytes |
//! | Reset | destination u8 |
//! | InsertFifoEvent | trigger_irq u8, event packet (first byte = length in words) |
//! | RunOp | op id u8 |
//! | GoToIndex | jump index u16, repeat counter u8 |
//! | Identifier | u16 |
//! | ExitInstruction, HostMutexOn, HostMutexOff | none |

use crate::constants::AGGREGATE_OP_INSTRUCTION_SIZE;
use crate::macros::wire_enum;
use crate::protocol::parser::{byte_at, le_u16_at, slice_at};
use crate::registers::OpId;
use crate::{Error, Result};

wire_enum! {
    /// Instruction type codes. `Reserved` (0x00) is padding, never an
    /// instruction.
    pub enum InstructionType {
        Reserved = 0x00,
        Write = 0x02,
        Reset = 0x08,
        InsertFifoEvent = 0x0e,
        RunOp = 0x30,
        GoToIndex = 0x31,
        ExitInstruction = 0x32,
        Identifier = 0x33,
        HostMutexOn = 0x34,
        HostMutexOff = 0x35,
    }
}

const WRITE_HEADER_SIZE: usize = 4;
const TRIGGER_IRQ_SIZE: usize = 1;

/// One aggregate op instruction with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AggregateOpInstruction {
    Write { address: u16, data: Vec<u8> },
    Reset { destination: u8 },
    /// `packet` is a complete event fifo packet; its first byte gives the
    /// length in 32-bit words.
    InsertFifoEvent { trigger_irq: bool, packet: Vec<u8> },
    /// Raw op id so buffers read back from a device with newer ops still
    /// decode.
    RunOp { op_id: u8 },
    GoToIndex { jump_index: u16, repeat_counter: u8 },
    Identifier(u16),
    ExitInstruction,
    HostMutexOn,
    HostMutexOff,
    Reserved,
}

impl AggregateOpInstruction {
    /// RunOp for a known op.
    pub fn run_op(op: OpId) -> Self {
        Self::RunOp { op_id: op.into() }
    }

    pub fn instruction_type(&self) -> InstructionType {
        match self {
            Self::Write { .. } => InstructionType::Write,
            Self::Reset { .. } => InstructionType::Reset,
            Self::InsertFifoEvent { .. } => InstructionType::InsertFifoEvent,
            Self::RunOp { .. } => InstructionType::RunOp,
            Self::GoToIndex { .. } => InstructionType::GoToIndex,
            Self::Identifier(_) => InstructionType::Identifier,
            Self::ExitInstruction => InstructionType::ExitInstruction,
            Self::HostMutexOn => InstructionType::HostMutexOn,
            Self::HostMutexOff => InstructionType::HostMutexOff,
            Self::Reserved => InstructionType::Reserved,
        }
    }

    /// Bytes this instruction occupies in the buffer, type code included.
    pub fn size(&self) -> Result<usize> {
        let payload = match self {
            Self::Write { data, .. } => {
                if data.len() > usize::from(u16::MAX) {
                    return Err(Error::BadParamValue(format!(
                        "write of {} bytes does not fit the length field",
                        data.len()
                    )));
                }
                WRITE_HEADER_SIZE + data.len()
            }
            Self::InsertFifoEvent { packet, .. } => {
                TRIGGER_IRQ_SIZE + fifo_packet_bytes(packet)?.len()
            }
            Self::Reset { .. } | Self::RunOp { .. } => 1,
            Self::GoToIndex { .. } => 3,
            Self::Identifier(_) => 2,
            Self::ExitInstruction | Self::HostMutexOn | Self::HostMutexOff => 0,
            Self::Reserved => {
                return Err(Error::BadParamValue(
                    "reserved is not an instruction".to_string(),
                ));
            }
        };
        Ok(AGGREGATE_OP_INSTRUCTION_SIZE + payload)
    }

    /// Append the encoded instruction to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        // validates payload lengths
        self.size()?;
        out.push(self.instruction_type().into());
        match self {
            Self::Write { address, data } => {
                out.extend_from_slice(&address.to_le_bytes());
                out.extend_from_slice(&(data.len() as u16).to_le_bytes());
                out.extend_from_slice(data);
            }
            Self::InsertFifoEvent { trigger_irq, packet } => {
                out.push(u8::from(*trigger_irq));
                out.extend_from_slice(fifo_packet_bytes(packet)?);
            }
            Self::Reset { destination } => out.push(*destination),
            Self::RunOp { op_id } => out.push(*op_id),
            Self::GoToIndex {
                jump_index,
                repeat_counter,
            } => {
                out.extend_from_slice(&jump_index.to_le_bytes());
                out.push(*repeat_counter);
            }
            Self::Identifier(id) => out.extend_from_slice(&id.to_le_bytes()),
            Self::ExitInstruction | Self::HostMutexOn | Self::HostMutexOff | Self::Reserved => {}
        }
        Ok(())
    }

    /// Decode the instruction at the start of `data`, returning it and its
    /// size in bytes.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let code = byte_at(data, 0)?;
        let kind = match InstructionType::try_from(code) {
            Ok(InstructionType::Reserved) | Err(_) => {
                return Err(Error::InvalidInstruction {
                    offset: 0,
                    value: code,
                });
            }
            Ok(kind) => kind,
        };
        let size = instruction_size(data)?;
        let payload = slice_at(data, AGGREGATE_OP_INSTRUCTION_SIZE, size - AGGREGATE_OP_INSTRUCTION_SIZE)?;
        let instruction = match kind {
            InstructionType::Write => Self::Write {
                address: le_u16_at(payload, 0)?,
                data: payload[WRITE_HEADER_SIZE..].to_vec(),
            },
            InstructionType::Reset => Self::Reset {
                destination: payload[0],
            },
            InstructionType::InsertFifoEvent => Self::InsertFifoEvent {
                trigger_irq: payload[0] != 0,
                packet: payload[TRIGGER_IRQ_SIZE..].to_vec(),
            },
            InstructionType::RunOp => Self::RunOp { op_id: payload[0] },
            InstructionType::GoToIndex => Self::GoToIndex {
                jump_index: le_u16_at(payload, 0)?,
                repeat_counter: payload[2],
            },
            InstructionType::Identifier => Self::Identifier(le_u16_at(payload, 0)?),
            InstructionType::ExitInstruction => Self::ExitInstruction,
            InstructionType::HostMutexOn => Self::HostMutexOn,
            InstructionType::HostMutexOff => Self::HostMutexOff,
            InstructionType::Reserved => Self::Reserved,
        };
        Ok((instruction, size))
    }
}

/// Size of the instruction starting at `data[0]`, derived from its type
/// code and, for Write and InsertFifoEvent, from its embedded length.
pub fn instruction_size(data: &[u8]) -> Result<usize> {
    let code = byte_at(data, 0)?;
    let payload = match InstructionType::try_from(code) {
        Ok(InstructionType::Write) => {
            WRITE_HEADER_SIZE + usize::from(le_u16_at(data, AGGREGATE_OP_INSTRUCTION_SIZE + 2)?)
        }
        Ok(InstructionType::InsertFifoEvent) => {
            let words = byte_at(data, AGGREGATE_OP_INSTRUCTION_SIZE + TRIGGER_IRQ_SIZE)?;
            TRIGGER_IRQ_SIZE + usize::from(words) * 4
        }
        Ok(InstructionType::Reset) | Ok(InstructionType::RunOp) => 1,
        Ok(InstructionType::GoToIndex) => 3,
        Ok(InstructionType::Identifier) => 2,
        Ok(InstructionType::ExitInstruction)
        | Ok(InstructionType::HostMutexOn)
        | Ok(InstructionType::HostMutexOff) => 0,
        Ok(InstructionType::Reserved) | Err(_) => {
            return Err(Error::InvalidInstruction {
                offset: 0,
                value: code,
            });
        }
    };
    Ok(AGGREGATE_OP_INSTRUCTION_SIZE + payload)
}

/// The bytes of `packet` covered by its length byte.
fn fifo_packet_bytes(packet: &[u8]) -> Result<&[u8]> {
    let words = *packet
        .first()
        .ok_or(Error::NullPointer("insert fifo event packet"))?;
    slice_at(packet, 0, usize::from(words) * 4)
}
