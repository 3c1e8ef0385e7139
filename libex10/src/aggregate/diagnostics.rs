// libex10-rs/libex10/src/aggregate/diagnostics.rs

use log::error;

use crate::aggregate::buffer::{AggregateOpBuffer, BufferSummary};
use crate::aggregate::instruction::AggregateOpInstruction;
use crate::fifo::packet::AggregateOpSummary;
use crate::registers::{OpsStatus, AGGREGATE_OP_BUFFER};
use crate::transport::RegisterTransport;
use crate::utils::hex_dump_lines;
use crate::Result;

/// Where an aggregate op run stopped, as located in the device buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateOpStop {
    /// The reported byte index does not start an instruction.
    NoInstructionAtIndex { index: usize },
    ReachedExit,
    /// The run ended on the `ordinal`-th instruction.
    FailedAt {
        ordinal: usize,
        instruction: AggregateOpInstruction,
    },
}

/// Report on a finished aggregate op: the stop location plus the parse of
/// the buffer read back from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOpReport {
    pub stop: AggregateOpStop,
    pub buffer: BufferSummary,
}

/// Read the aggregate op buffer back and explain where the run described
/// by `summary` stopped.
pub fn print_aggregate_op_errors(
    summary: &AggregateOpSummary,
    transport: &mut dyn RegisterTransport,
) -> Result<AggregateOpReport> {
    if summary.last_inner_op_error != OpsStatus::ErrorNone as u8 {
        let status = OpsStatus::try_from(summary.last_inner_op_error)
            .map_or_else(|_| "unknown".to_string(), |s| s.to_string());
        error!(
            "The last op run in the aggregate op was {:#x}, which ended with error code {} ({})",
            summary.last_inner_op_run, summary.last_inner_op_error, status
        );
        error!(
            "The number of ops that ran including the one that failed is {}",
            summary.op_run_count
        );
    }

    let buffer = AggregateOpBuffer::from_bytes(&transport.read(&AGGREGATE_OP_BUFFER)?);
    let index = usize::from(summary.final_buffer_byte_index);
    let stop = match buffer.get_instruction_from_index(index) {
        Err(_) => {
            error!("There is no valid instruction at the index which was reported to cause the error");
            error!("agg op buffer:");
            for line in hex_dump_lines(buffer.as_bytes()) {
                error!("{}", line);
            }
            AggregateOpStop::NoInstructionAtIndex { index }
        }
        Ok((AggregateOpInstruction::ExitInstruction, _)) => {
            error!("The aggregate op successfully reached an exit instruction.");
            AggregateOpStop::ReachedExit
        }
        Ok((instruction, ordinal)) => {
            error!("The error occurred at instruction {} in the buffer", ordinal);
            AggregateOpStop::FailedAt {
                ordinal,
                instruction,
            }
        }
    };

    error!("Dumping the contents of the buffer for debug");
    Ok(AggregateOpReport {
        stop,
        buffer: buffer.print_buffer(),
    })
}
