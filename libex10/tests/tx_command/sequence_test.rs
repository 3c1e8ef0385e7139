#[path = "../common/mod.rs"]
mod common;

use libex10::protocol::{Gen2CommandType, Gen2TxnControls, ResponseType};
use libex10::registers::{
    GEN2_ACCESS_ENABLE, GEN2_AUTO_ACCESS_ENABLE, GEN2_LENGTHS, GEN2_SELECT_ENABLE,
    GEN2_TRANSACTION_IDS, GEN2_TXN_CONTROLS,
};
use libex10::transport::MockTransport;
use libex10::tx_command::TxCommandManager;
use libex10::Error;

/// select, read, write in slots 0..3
fn loaded_manager() -> TxCommandManager {
    let mut m = TxCommandManager::new();
    m.encode_and_append_command(&common::fixtures::sample_select(), 0x10).unwrap();
    m.encode_and_append_command(&common::fixtures::sample_read(), 0x11).unwrap();
    m.encode_and_append_command(&common::fixtures::sample_write(), 0x12).unwrap();
    m
}

#[test]
fn select_then_halted_access() -> anyhow::Result<()> {
    common::fixtures::init_logging();
    let m = loaded_manager();
    let mut device = MockTransport::new();

    m.clear_sequence(&mut device)?;
    m.write_sequence(&mut device)?;
    m.write_select_enables(&[true], &mut device)?;
    m.write_halted_enables(&[false, true, true], &mut device)?;
    m.write_auto_access_enables(&[], &mut device)?;

    assert_eq!(device.peek(&GEN2_SELECT_ENABLE), &[0x01, 0x00]);
    assert_eq!(device.peek(&GEN2_ACCESS_ENABLE), &[0x06, 0x00]);
    assert_eq!(device.peek(&GEN2_AUTO_ACCESS_ENABLE), &[0x00, 0x00]);
    assert_eq!(&device.peek(&GEN2_TRANSACTION_IDS)[..4], &[0x10, 0x11, 0x12, 0x00]);

    let controls = device.peek(&GEN2_TXN_CONTROLS);
    let select = Gen2TxnControls::from_bytes(&controls[0..4])?;
    assert_eq!(select.response_type, ResponseType::None);
    let read = Gen2TxnControls::from_bytes(&controls[4..8])?;
    assert!(read.has_header_bit);
    assert_eq!(read.rx_length, 33 + 16 * 4);

    m.dump_control_registers(&mut device)?;
    Ok(())
}

#[test]
fn device_image_rebuilds_local_table() -> anyhow::Result<()> {
    let m = loaded_manager();
    let mut device = MockTransport::new();
    m.write_sequence(&mut device)?;

    let mut other = TxCommandManager::new();
    other.read_device_to_local_sequence(&mut device)?;
    other.print_local_sequence();

    let kinds: Vec<_> = other
        .get_local_sequence()
        .iter()
        .filter(|c| c.valid)
        .map(|c| c.decoded.as_ref().map(|d| d.command_type()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(Gen2CommandType::Select),
            Some(Gen2CommandType::Read),
            Some(Gen2CommandType::Write),
        ]
    );
    for (a, b) in m.get_local_sequence().iter().zip(other.get_local_sequence()).take(3) {
        assert_eq!(a.encoded, b.encoded);
        assert_eq!(a.decoded, b.decoded);
    }
    Ok(())
}

#[test]
fn cleared_slot_is_skipped_and_reused() -> anyhow::Result<()> {
    let mut m = loaded_manager();
    m.clear_command_in_local_sequence(1)?;
    let mut device = MockTransport::new();
    m.write_sequence(&mut device)?;
    let lengths = device.peek(&GEN2_LENGTHS);
    assert_eq!(&lengths[2..4], &[0, 0]);

    match m.write_halted_enables(&[false, true], &mut device) {
        Err(Error::Gen2EmptyCommand { index: 1 }) => {}
        other => panic!("expected Gen2EmptyCommand, got: {:?}", other),
    }

    let slot = m.encode_and_append_command(&common::fixtures::sample_read(), 0x20)?;
    assert_eq!(slot, 1);
    Ok(())
}

#[test]
fn failed_register_write_surfaces() {
    let m = loaded_manager();
    let mut device = MockTransport::new();
    device.write_failures = 1;
    assert!(matches!(m.write_sequence(&mut device), Err(Error::HostInterface(_))));
}
