#[path = "../common/mod.rs"]
mod common;

use libex10::aggregate::{clear_buffer, print_aggregate_op_errors, AggregateOpStop};
use libex10::fifo::AggregateOpSummary;
use libex10::registers::{OpId, OpsStatus, AGGREGATE_OP_BUFFER};
use libex10::transport::{MockTransport, RegisterTransport};

#[test]
fn buffer_reaches_device_and_back() -> anyhow::Result<()> {
    let buf = common::fixtures::ramp_up_buffer();
    let mut device = MockTransport::new();
    device.load(AGGREGATE_OP_BUFFER.address, &[0xff; 512]);

    clear_buffer(&mut device)?;
    buf.set_buffer(&mut device)?;

    let image = device.read(&AGGREGATE_OP_BUFFER)?;
    assert_eq!(&image[..buf.len()], buf.as_bytes());
    assert!(image[buf.len()..].iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn stop_locations() -> anyhow::Result<()> {
    common::fixtures::init_logging();
    let mut device = MockTransport::new();
    common::fixtures::ramp_up_buffer().set_buffer(&mut device)?;

    let ok = AggregateOpSummary {
        op_run_count: 2,
        write_count: 2,
        final_buffer_byte_index: 22,
        ..Default::default()
    };
    assert_eq!(
        print_aggregate_op_errors(&ok, &mut device)?.stop,
        AggregateOpStop::ReachedExit
    );

    let failed = AggregateOpSummary {
        op_run_count: 1,
        final_buffer_byte_index: 9,
        last_inner_op_run: OpId::SetTxCoarseGainOp.into(),
        last_inner_op_error: OpsStatus::ErrorInvalidParameter.into(),
        ..Default::default()
    };
    match print_aggregate_op_errors(&failed, &mut device)?.stop {
        AggregateOpStop::FailedAt { ordinal: 1, .. } => {}
        other => panic!("expected FailedAt, got: {:?}", other),
    }

    let bogus = AggregateOpSummary {
        final_buffer_byte_index: 400,
        ..Default::default()
    };
    assert_eq!(
        print_aggregate_op_errors(&bogus, &mut device)?.stop,
        AggregateOpStop::NoInstructionAtIndex { index: 400 }
    );
    Ok(())
}
