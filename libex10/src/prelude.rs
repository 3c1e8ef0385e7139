// libex10-rs/libex10/src/prelude.rs

pub use crate::aggregate::{AggregateOpBuffer, AggregateOpInstruction, BufferSummary};
pub use crate::fifo::{EventFifoPacket, EventFifoQueue, EventPacketType, FifoBufferPools, PacketData};
pub use crate::protocol::{Gen2Command, Gen2CommandType, Gen2Reply};
pub use crate::registers::{OpId, OpsStatus, RegisterInfo};
pub use crate::transport::{MockTransport, RegisterTransport};
pub use crate::tx_command::TxCommandManager;
pub use crate::{BitSpan, Error, Result};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, default_packet_wait, ms, parse_hex};
