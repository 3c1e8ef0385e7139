// libex10-rs/libex10/src/aggregate/mod.rs

//! Aggregate op buffers.
//!
//! An aggregate op is a small program of register writes and op runs that
//! the device executes from its `AggregateOpBuffer` register. This module
//! builds such programs on the host, parses them back and explains where a
//! failed run stopped.

pub mod buffer;
pub mod builder;
pub mod diagnostics;
pub mod instruction;

pub use buffer::{clear_buffer, print_buffer, print_instruction, AggregateOpBuffer, BufferSummary};
pub use diagnostics::{print_aggregate_op_errors, AggregateOpReport, AggregateOpStop};
pub use instruction::{instruction_size, AggregateOpInstruction, InstructionType};
