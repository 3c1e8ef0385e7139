#[path = "../common/mod.rs"]
mod common;

use libex10::aggregate::{AggregateOpInstruction, BufferSummary, InstructionType};
use libex10::registers::OpId;

#[test]
fn coarse_gain_ramp_up_exit() {
    common::fixtures::init_logging();
    let buf = common::fixtures::ramp_up_buffer();

    // two helpers of write + run op, then exit
    assert_eq!(
        buf.print_buffer(),
        BufferSummary {
            instructions: 5,
            reserved: 0,
            invalid: 0,
        }
    );

    let exit_offset = buf.len() - 1;
    let (instruction, ordinal) = buf.get_instruction_from_index(exit_offset).unwrap();
    assert_eq!(instruction.instruction_type(), InstructionType::ExitInstruction);
    assert_eq!(ordinal, 4);

    let (ramp, ordinal) = buf.get_instruction_from_index(20).unwrap();
    assert_eq!(ramp, AggregateOpInstruction::run_op(OpId::TxRampUpOp));
    assert_eq!(ordinal, 3);
}

#[test]
fn loop_back_with_repeat() {
    let mut buf = common::fixtures::ramp_up_buffer();
    buf.clear();
    buf.append_identifier(1).unwrap();
    let body = buf.len() as u16;
    buf.append_measure_rssi(4).unwrap();
    buf.append_go_to_instruction(body, 3).unwrap();
    buf.append_exit_instruction().unwrap();

    let (target, ordinal) = buf.get_instruction_from_index(usize::from(body)).unwrap();
    assert_eq!(ordinal, 1);
    assert_eq!(target.instruction_type(), InstructionType::Write);
    assert_eq!(buf.print_buffer().instructions, 5);
}

#[test]
fn extended_buffer_holds_more() {
    use libex10::constants::{AGGREGATE_OP_BUFFER_EXTENDED_LENGTH, AGGREGATE_OP_BUFFER_REG_LENGTH};
    use libex10::aggregate::AggregateOpBuffer;

    fn fill(buf: &mut AggregateOpBuffer) -> usize {
        let mut n = 0;
        while buf.append_set_tx_coarse_gain(1).is_ok() {
            n += 1;
        }
        n
    }

    let mut small = AggregateOpBuffer::new();
    let mut big = AggregateOpBuffer::with_capacity(AGGREGATE_OP_BUFFER_EXTENDED_LENGTH);
    let (a, b) = (fill(&mut small), fill(&mut big));
    assert!(b > a);
    assert!(small.len() < AGGREGATE_OP_BUFFER_REG_LENGTH);
    assert!(big.len() < AGGREGATE_OP_BUFFER_EXTENDED_LENGTH);
}
