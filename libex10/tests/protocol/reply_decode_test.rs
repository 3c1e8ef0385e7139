#[path = "../common/mod.rs"]
mod common;

use libex10::fifo::parse_event_packet;
use libex10::protocol::{
    check_error, decode_reply, Gen2CommandType, Gen2TransactionStatus, TagErrorCode,
};
use libex10::Error;

#[test]
fn read_reply_through_wire_format() -> anyhow::Result<()> {
    common::fixtures::init_logging();
    // header bit clear, then one data word
    let bytes = common::fixtures::gen2_reply_packet(17, &[0x00, 0x12, 0x34]).to_bytes()?;
    let mut cursor = bytes.as_slice();
    let packet = parse_event_packet(&mut cursor);
    assert!(packet.is_valid);
    assert!(cursor.is_empty());

    let reply = decode_reply(Gen2CommandType::Read, &packet)?;
    assert_eq!(reply.num_bits, 16);
    assert_eq!(reply.data, vec![0x1234]);
    assert!(!check_error(&reply));
    Ok(())
}

#[test]
fn tag_error_surfaces() {
    let packet = common::fixtures::gen2_reply_packet(9, &[0x01, 0x04]);
    match decode_reply(Gen2CommandType::Write, &packet) {
        Err(Error::TagError(TagErrorCode::MemoryLocked)) => {}
        other => panic!("expected TagError, got: {:?}", other),
    }
}

#[test]
fn failed_transaction_surfaces() {
    let mut packet = common::fixtures::gen2_reply_packet(0, &[]);
    // status byte of the Gen2Transaction static data
    packet.static_data[1] = 3;
    match decode_reply(Gen2CommandType::Read, &packet) {
        Err(Error::Gen2TransactionStatus(Gen2TransactionStatus::NoReply)) => {}
        other => panic!("expected Gen2TransactionStatus, got: {:?}", other),
    }
}
