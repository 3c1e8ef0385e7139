// libex10-rs/libex10/src/constants.rs
//! Sizes and counts shared across the crate

/// Number of slots in the local (and device side) Gen2 command table.
pub const MAX_TX_COMMAND_COUNT: usize = 10;

/// Scratch size used when encoding a single Gen2 command.
pub const TX_COMMAND_ENCODE_BUFFER_SIZE: usize = 40;

/// Scratch size returned by the bit unpackers.
pub const TX_COMMAND_DECODE_BUFFER_SIZE: usize = 40;

/// Largest encoded Gen2 command accepted from the device tx buffer.
pub const MAX_COMMAND_BYTES: usize = 0x20;

/// Gen2 tx buffer register length in bytes.
pub const GEN2_TX_BUFFER_REG_LENGTH: usize = 0x80;

/// Device aggregate op buffer size.
pub const AGGREGATE_OP_BUFFER_REG_LENGTH: usize = 512;

/// Extended aggregate op buffer size used by larger firmware images.
pub const AGGREGATE_OP_BUFFER_EXTENDED_LENGTH: usize = 768;

/// Size of the instruction tag byte that leads every aggregate instruction.
pub const AGGREGATE_OP_INSTRUCTION_SIZE: usize = 1;

/// Largest event fifo packet that may be injected through an aggregate op.
pub const AGGREGATE_OP_MAX_FIFO_PACKET_BYTES: usize = 64;

/// Bytes the device may return in a single event fifo read.
pub const EX10_EVENT_FIFO_SIZE: usize = 0x1000;

/// Extra room at the front of each event buffer for the host interface
/// response code.
pub const FIFO_HEADER_SPACE: usize = 4;

/// Raw buffer size of result pool nodes. Pool membership is derived from
/// this length, so event buffers must never share it.
pub const RESULT_FIFO_BUFFER_SIZE_BYTES: usize = 16;

/// Number of buffers in the event pool.
pub const EVENT_FIFO_BUFFER_COUNT: usize = 8;

/// Number of buffers in the result pool.
pub const RESULT_FIFO_BUFFER_COUNT: usize = 4;

/// Event fifo packet format identifier carried in every packet header.
pub const EVENT_PACKET_FORMAT_SHA: u16 = 0xbf4b;

/// Transmitter mutex time written by the regulatory timer helper.
pub const TX_MUTEX_TIME_US: u16 = 1500;

/// Delay applied by the boosted ramp up before settling.
pub const BOOST_RAMP_DELAY_US: u32 = 840;
