//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common fixtures (Gen2 commands, event fifo
//! packets, pools) so tests across the crate and the tests/ directory can
//! reuse the same logic.
#![allow(dead_code)]

use crate::fifo::{EventFifoPacket, EventPacketType, FifoBufferList, FifoBufferPools};
use crate::protocol::{
    Gen2Command, MemoryBank, ReadCommandArgs, SelectAction, SelectCommandArgs, SelectMemoryBank,
    SelectTarget,
};
use crate::{BitSpan, Result};

/// Select on the EPC bank matching `mask` at bit 0x20.
#[doc(hidden)]
pub fn sample_select(mask: &[u8]) -> Gen2Command {
    Gen2Command::Select(SelectCommandArgs {
        target: SelectTarget::Session0,
        action: SelectAction::Action000,
        memory_bank: SelectMemoryBank::Epc,
        bit_pointer: 0x20,
        bit_count: (mask.len() * 8) as u8,
        mask: Some(BitSpan::from_bytes(mask)),
        truncate: false,
    })
}

/// Read of `word_count` TID words.
#[doc(hidden)]
pub fn sample_read(word_count: u8) -> Gen2Command {
    Gen2Command::Read(ReadCommandArgs {
        memory_bank: MemoryBank::Tid,
        word_pointer: 0,
        word_count,
    })
}

/// Wire bytes of consecutive `Custom` packets, one per payload. The
/// microsecond counter of each packet is its position.
#[doc(hidden)]
pub fn custom_packets(payloads: &[&[u8]]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, payload) in payloads.iter().enumerate() {
        let payload_len = (payload.len() as u32).to_le_bytes();
        let mut packet = EventFifoPacket::new(EventPacketType::Custom, &payload_len, payload);
        packet.us_counter = i as u32;
        out.extend_from_slice(&packet.to_bytes()?);
    }
    Ok(out)
}

/// Pools with `events` minimum size event buffers and `results` result
/// buffers.
#[doc(hidden)]
pub fn small_pools(events: usize, results: usize) -> Result<FifoBufferPools> {
    Ok(FifoBufferPools::new(
        FifoBufferList::new_event_list(vec![vec![0u8; 4100]; events])?,
        FifoBufferList::new_result_list(vec![vec![0u8; 16]; results])?,
    ))
}
