// libex10-rs/libex10/src/fifo/packet.rs

//! EventFifo packet format.
//!
//! Every packet is an 8 byte header (length in 32-bit words, type, format
//! SHA, microsecond counter) followed by a fixed size static payload for its
//! type and optional dynamic data, padded to a 32-bit boundary.

use log::{debug, error, warn};

use crate::constants::EVENT_PACKET_FORMAT_SHA;
use crate::error::ResultRecord;
use crate::macros::wire_enum;
use crate::protocol::parser::{byte_at, ensure_len, le_u16_at, le_u32_at};
use crate::{Error, Result};

wire_enum! {
    /// Packet type byte of the header.
    pub enum EventPacketType {
        TxRampUp = 0x01,
        TxRampDown = 0x02,
        InventoryRoundSummary = 0x03,
        QChanged = 0x04,
        TagRead = 0x05,
        TagReadExtended = 0x06,
        Gen2Transaction = 0x07,
        ContinuousInventorySummary = 0x08,
        HelloWorld = 0x09,
        Custom = 0x0a,
        PowerControlLoopSummary = 0x0b,
        AggregateOpSummary = 0x0d,
        Halted = 0x0e,
        InvalidPacket = 0xf0,
        FifoOverflowPacket = 0xf1,
        Ex10ResultPacket = 0xf2,
        SjcMeasurement = 0xfe,
        Debug = 0xff,
    }
}

impl EventPacketType {
    /// Size of the static payload that follows the header.
    pub const fn static_size(self) -> usize {
        use EventPacketType::*;
        match self {
            TxRampUp | TxRampDown | HelloWorld | Custom | Halted | InvalidPacket
            | FifoOverflowPacket | Debug => 4,
            PowerControlLoopSummary | Ex10ResultPacket => 8,
            QChanged | TagRead | Gen2Transaction | SjcMeasurement => 12,
            ContinuousInventorySummary | AggregateOpSummary => 16,
            InventoryRoundSummary | TagReadExtended => 20,
        }
    }

    /// Whether the device may legitimately emit this type. `InvalidPacket`
    /// only marks a parse failure on the host.
    pub fn is_valid(self) -> bool {
        self != EventPacketType::InvalidPacket
    }
}

/// Size of the static payload for a raw type byte; 0 for unknown types.
pub fn get_static_payload_length(packet_type: u8) -> usize {
    EventPacketType::try_from(packet_type)
        .map(EventPacketType::static_size)
        .unwrap_or(0)
}

/// パケットヘッダ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketHeader {
    /// Whole packet length in 32-bit words.
    pub packet_length: u8,
    pub packet_type: u8,
    pub format_sha: u16,
    pub us_counter: u32,
}

impl PacketHeader {
    pub const SIZE: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        ensure_len(data, Self::SIZE)?;
        Ok(Self {
            packet_length: data[0],
            packet_type: data[1],
            format_sha: le_u16_at(data, 2)?,
            us_counter: le_u32_at(data, 4)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let sha = self.format_sha.to_le_bytes();
        let us = self.us_counter.to_le_bytes();
        [
            self.packet_length,
            self.packet_type,
            sha[0],
            sha[1],
            us[0],
            us[1],
            us[2],
            us[3],
        ]
    }

    pub fn length_bytes(&self) -> usize {
        usize::from(self.packet_length) * 4
    }
}

/// Header for a packet of `packet_type` carrying no dynamic data.
pub fn make_packet_header(packet_type: EventPacketType) -> PacketHeader {
    PacketHeader {
        packet_length: ((PacketHeader::SIZE + packet_type.static_size()) / 4) as u8,
        packet_type: packet_type as u8,
        format_sha: EVENT_PACKET_FORMAT_SHA,
        us_counter: 0,
    }
}

/// One parsed EventFifo packet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventFifoPacket {
    pub packet_type: EventPacketType,
    pub us_counter: u32,
    pub static_data: Vec<u8>,
    pub dynamic_data: Vec<u8>,
    pub is_valid: bool,
}

impl EventFifoPacket {
    /// Marker returned when a packet could not be parsed.
    pub fn invalid() -> Self {
        Self {
            packet_type: EventPacketType::InvalidPacket,
            us_counter: 0,
            static_data: Vec::new(),
            dynamic_data: Vec::new(),
            is_valid: false,
        }
    }

    pub fn new(packet_type: EventPacketType, static_data: &[u8], dynamic_data: &[u8]) -> Self {
        Self {
            packet_type,
            us_counter: 0,
            static_data: static_data.to_vec(),
            dynamic_data: dynamic_data.to_vec(),
            is_valid: true,
        }
    }

    /// Decode the static payload.
    pub fn data(&self) -> Result<PacketData> {
        if !self.is_valid {
            return Err(Error::InvalidEventPacket(
                "packet was not parsed successfully".to_string(),
            ));
        }
        PacketData::from_bytes(self.packet_type, &self.static_data)
    }

    /// Serialize to the wire format, header first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        create_fifo_event(self)
    }
}

/// Parse the packet at the front of `bytes` and advance past it.
///
/// On an invalid packet `bytes` is emptied: the rest of the buffer can not
/// be framed reliably.
pub fn parse_event_packet(bytes: &mut &[u8]) -> EventFifoPacket {
    let data = *bytes;
    let header = match PacketHeader::from_bytes(data) {
        Ok(header) => header,
        Err(_) => {
            warn!("truncated event fifo packet: {} bytes", data.len());
            *bytes = &[];
            return EventFifoPacket::invalid();
        }
    };

    let packet_length = header.length_bytes();
    let known = EventPacketType::try_from(header.packet_type).ok();
    let static_length = get_static_payload_length(header.packet_type);
    let min_length = PacketHeader::SIZE + static_length;

    let packet_type = match known {
        Some(packet_type)
            if packet_type.is_valid()
                && header.format_sha == EVENT_PACKET_FORMAT_SHA
                && packet_length >= min_length
                && packet_length <= data.len() =>
        {
            packet_type
        }
        _ => {
            if header.format_sha != EVENT_PACKET_FORMAT_SHA {
                error!(
                    "Event Fifo packet with invalid SHA detected Expected: {:#06x} Received: {:#06x}",
                    EVENT_PACKET_FORMAT_SHA, header.format_sha
                );
                error!("the SDK and firmware versions are likely different");
            } else {
                warn!(
                    "Unknown packet: type: {}, static_length: {} sha: {:#06x}",
                    header.packet_type, static_length, header.format_sha
                );
                debug!("{}", crate::utils::bytes_to_hex_spaced(data));
            }
            *bytes = &[];
            return EventFifoPacket::invalid();
        }
    };

    let packet = EventFifoPacket {
        packet_type,
        us_counter: header.us_counter,
        static_data: data[PacketHeader::SIZE..min_length].to_vec(),
        dynamic_data: data[min_length..packet_length].to_vec(),
        is_valid: true,
    };
    *bytes = &data[packet_length..];
    packet
}

/// Serialize `packet` into its wire form: header, static data, dynamic data
/// and zero padding up to a 32-bit boundary.
pub fn create_fifo_event(packet: &EventFifoPacket) -> Result<Vec<u8>> {
    let event_bytes =
        PacketHeader::SIZE + packet.static_data.len() + packet.dynamic_data.len();
    let padding = (4 - event_bytes % 4) % 4;
    let packet_bytes = event_bytes + padding;
    let words = u8::try_from(packet_bytes / 4).map_err(|_| {
        Error::BadParamValue(format!(
            "event packet of {} bytes does not fit the length field",
            packet_bytes
        ))
    })?;

    let mut header = make_packet_header(packet.packet_type);
    header.packet_length = words;
    header.us_counter = packet.us_counter;

    let mut out = Vec::with_capacity(packet_bytes);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&packet.static_data);
    out.extend_from_slice(&packet.dynamic_data);
    out.resize(packet_bytes, 0);
    Ok(out)
}

/// Build the `Gen2Transaction` packet the device emits for a tag reply.
pub fn make_gen2_transaction_packet(txn: Gen2Transaction, reply: &[u8]) -> EventFifoPacket {
    EventFifoPacket::new(EventPacketType::Gen2Transaction, &txn.to_bytes(), reply)
}

/// Wire image of an `Ex10ResultPacket`.
pub fn make_result_packet_bytes(record: &ResultRecord, us_counter: u32) -> [u8; 16] {
    let mut header = make_packet_header(EventPacketType::Ex10ResultPacket);
    header.us_counter = us_counter;
    let mut out = [0u8; 16];
    out[..PacketHeader::SIZE].copy_from_slice(&header.to_bytes());
    out[PacketHeader::SIZE..].copy_from_slice(&record.to_bytes());
    out
}

#[inline]
fn le_i16_at(data: &[u8], idx: usize) -> Result<i16> {
    le_u16_at(data, idx).map(|v| v as i16)
}

#[inline]
fn le_i32_at(data: &[u8], idx: usize) -> Result<i32> {
    le_u32_at(data, idx).map(|v| v as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxRampUp {
    pub carrier_frequency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxRampDown {
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryRoundSummary {
    pub duration_us: u32,
    pub total_slots: u32,
    pub num_slots: u16,
    pub empty_slots: u16,
    pub single_slots: u16,
    pub collided_slots: u16,
    pub reason: u8,
    pub final_q: u8,
    pub min_q_count: u8,
    pub queries_since_valid_epc_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QChanged {
    pub num_slots: u16,
    pub empty_slots: u16,
    pub single_slots: u16,
    pub collided_slots: u16,
    pub q_value: u8,
    pub sent_query: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagRead {
    pub rssi: u16,
    pub rf_phase_begin: u16,
    pub rf_phase_end: u16,
    pub rx_gain_settings: u16,
    /// Raw `TagReadType`.
    pub read_type: u8,
    pub tid_offset: u8,
    pub halted_on_tag: bool,
    pub memory_parity_err: bool,
}

impl TagRead {
    pub const SIZE: usize = 12;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        for (i, word) in [
            self.rssi,
            self.rf_phase_begin,
            self.rf_phase_end,
            self.rx_gain_settings,
        ]
        .into_iter()
        .enumerate()
        {
            out[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        out[8] = self.read_type;
        out[9] = self.tid_offset;
        out[10] = u8::from(self.halted_on_tag) | u8::from(self.memory_parity_err) << 1;
        out
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let flags = byte_at(data, 10)?;
        Ok(Self {
            rssi: le_u16_at(data, 0)?,
            rf_phase_begin: le_u16_at(data, 2)?,
            rf_phase_end: le_u16_at(data, 4)?,
            rx_gain_settings: le_u16_at(data, 6)?,
            read_type: byte_at(data, 8)?,
            tid_offset: byte_at(data, 9)?,
            halted_on_tag: flags & 0x01 != 0,
            memory_parity_err: flags & 0x02 != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagReadExtended {
    pub tag_read: TagRead,
    pub cr_value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gen2Transaction {
    pub transaction_id: u8,
    /// Raw `Gen2TransactionStatus`.
    pub status: u8,
    pub valid_path_metrics: u8,
    pub rf_phase_begin: u16,
    pub rf_phase_end: u16,
    pub rssi: u16,
    pub num_bits: u16,
}

impl Gen2Transaction {
    pub const SIZE: usize = 12;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.transaction_id;
        out[1] = self.status;
        out[2] = self.valid_path_metrics;
        out[4..6].copy_from_slice(&self.rf_phase_begin.to_le_bytes());
        out[6..8].copy_from_slice(&self.rf_phase_end.to_le_bytes());
        out[8..10].copy_from_slice(&self.rssi.to_le_bytes());
        out[10..12].copy_from_slice(&self.num_bits.to_le_bytes());
        out
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            transaction_id: byte_at(data, 0)?,
            status: byte_at(data, 1)?,
            valid_path_metrics: byte_at(data, 2)?,
            rf_phase_begin: le_u16_at(data, 4)?,
            rf_phase_end: le_u16_at(data, 6)?,
            rssi: le_u16_at(data, 8)?,
            num_bits: le_u16_at(data, 10)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContinuousInventorySummary {
    pub duration_us: u32,
    pub number_of_inventory_rounds: u32,
    pub number_of_tags: u32,
    pub reason: u8,
    pub last_op_id: u8,
    pub last_op_error: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HelloWorld {
    pub sku: u16,
    pub reset_reason: u8,
    pub crash_info: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerControlLoopSummary {
    pub iterations: u32,
    pub final_error: i16,
    pub final_tx_fine_gain: i16,
}

/// Result of an aggregate op run as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateOpSummary {
    pub op_run_count: u16,
    pub write_count: u16,
    pub insert_fifo_count: u16,
    /// Buffer offset of the instruction that ended the run.
    pub final_buffer_byte_index: u16,
    pub total_jump_count: u16,
    pub last_inner_op_run: u8,
    /// Raw `OpsStatus` of the last inner op.
    pub last_inner_op_error: u8,
    pub identifier: u16,
    pub last_inner_command_run: u8,
    pub last_inner_command_error: u8,
}

impl AggregateOpSummary {
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        for (i, word) in [
            self.op_run_count,
            self.write_count,
            self.insert_fifo_count,
            self.final_buffer_byte_index,
            self.total_jump_count,
        ]
        .into_iter()
        .enumerate()
        {
            out[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        out[10] = self.last_inner_op_run;
        out[11] = self.last_inner_op_error;
        out[12..14].copy_from_slice(&self.identifier.to_le_bytes());
        out[14] = self.last_inner_command_run;
        out[15] = self.last_inner_command_error;
        out
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            op_run_count: le_u16_at(data, 0)?,
            write_count: le_u16_at(data, 2)?,
            insert_fifo_count: le_u16_at(data, 4)?,
            final_buffer_byte_index: le_u16_at(data, 6)?,
            total_jump_count: le_u16_at(data, 8)?,
            last_inner_op_run: byte_at(data, 10)?,
            last_inner_op_error: byte_at(data, 11)?,
            identifier: le_u16_at(data, 12)?,
            last_inner_command_run: byte_at(data, 14)?,
            last_inner_command_error: byte_at(data, 15)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Halted {
    pub handle: u16,
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FifoOverflow {
    pub num_bytes_over: u16,
    pub overflowing_packet_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SjcMeasurement {
    pub cdac_i: i8,
    pub cdac_q: i8,
    pub rx_atten: u8,
    pub flags: u8,
    pub residue_i: i32,
    pub residue_q: i32,
}

/// Typed view of a packet's static payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketData {
    TxRampUp(TxRampUp),
    TxRampDown(TxRampDown),
    InventoryRoundSummary(InventoryRoundSummary),
    QChanged(QChanged),
    TagRead(TagRead),
    TagReadExtended(TagReadExtended),
    Gen2Transaction(Gen2Transaction),
    ContinuousInventorySummary(ContinuousInventorySummary),
    HelloWorld(HelloWorld),
    /// Length of the custom payload carried as dynamic data.
    Custom { payload_len: u32 },
    PowerControlLoopSummary(PowerControlLoopSummary),
    AggregateOpSummary(AggregateOpSummary),
    Halted(Halted),
    InvalidPacket,
    FifoOverflow(FifoOverflow),
    Ex10Result(ResultRecord),
    SjcMeasurement(SjcMeasurement),
    Debug { payload_len: u32 },
}

impl PacketData {
    pub fn from_bytes(packet_type: EventPacketType, d: &[u8]) -> Result<Self> {
        use EventPacketType as T;
        ensure_len(d, packet_type.static_size())?;
        Ok(match packet_type {
            T::TxRampUp => PacketData::TxRampUp(TxRampUp {
                carrier_frequency: le_u32_at(d, 0)?,
            }),
            T::TxRampDown => PacketData::TxRampDown(TxRampDown {
                reason: byte_at(d, 0)?,
            }),
            T::InventoryRoundSummary => {
                PacketData::InventoryRoundSummary(InventoryRoundSummary {
                    duration_us: le_u32_at(d, 0)?,
                    total_slots: le_u32_at(d, 4)?,
                    num_slots: le_u16_at(d, 8)?,
                    empty_slots: le_u16_at(d, 10)?,
                    single_slots: le_u16_at(d, 12)?,
                    collided_slots: le_u16_at(d, 14)?,
                    reason: byte_at(d, 16)?,
                    final_q: byte_at(d, 17)?,
                    min_q_count: byte_at(d, 18)?,
                    queries_since_valid_epc_count: byte_at(d, 19)?,
                })
            }
            T::QChanged => PacketData::QChanged(QChanged {
                num_slots: le_u16_at(d, 0)?,
                empty_slots: le_u16_at(d, 2)?,
                single_slots: le_u16_at(d, 4)?,
                collided_slots: le_u16_at(d, 6)?,
                q_value: byte_at(d, 8)?,
                sent_query: byte_at(d, 9)?,
            }),
            T::TagRead => PacketData::TagRead(TagRead::from_bytes(d)?),
            T::TagReadExtended => PacketData::TagReadExtended(TagReadExtended {
                tag_read: TagRead::from_bytes(d)?,
                cr_value: le_u32_at(d, 16)?,
            }),
            T::Gen2Transaction => PacketData::Gen2Transaction(Gen2Transaction::from_bytes(d)?),
            T::ContinuousInventorySummary => {
                PacketData::ContinuousInventorySummary(ContinuousInventorySummary {
                    duration_us: le_u32_at(d, 0)?,
                    number_of_inventory_rounds: le_u32_at(d, 4)?,
                    number_of_tags: le_u32_at(d, 8)?,
                    reason: byte_at(d, 12)?,
                    last_op_id: byte_at(d, 13)?,
                    last_op_error: byte_at(d, 14)?,
                })
            }
            T::HelloWorld => PacketData::HelloWorld(HelloWorld {
                sku: le_u16_at(d, 0)?,
                reset_reason: byte_at(d, 2)?,
                crash_info: byte_at(d, 3)?,
            }),
            T::Custom => PacketData::Custom {
                payload_len: le_u32_at(d, 0)?,
            },
            T::PowerControlLoopSummary => {
                PacketData::PowerControlLoopSummary(PowerControlLoopSummary {
                    iterations: le_u32_at(d, 0)?,
                    final_error: le_i16_at(d, 4)?,
                    final_tx_fine_gain: le_i16_at(d, 6)?,
                })
            }
            T::AggregateOpSummary => {
                PacketData::AggregateOpSummary(AggregateOpSummary::from_bytes(d)?)
            }
            T::Halted => PacketData::Halted(Halted {
                handle: le_u16_at(d, 0)?,
                reason: byte_at(d, 2)?,
            }),
            T::InvalidPacket => PacketData::InvalidPacket,
            T::FifoOverflowPacket => PacketData::FifoOverflow(FifoOverflow {
                num_bytes_over: le_u16_at(d, 0)?,
                overflowing_packet_type: byte_at(d, 2)?,
            }),
            T::Ex10ResultPacket => PacketData::Ex10Result(ResultRecord::from_bytes(d)?),
            T::SjcMeasurement => PacketData::SjcMeasurement(SjcMeasurement {
                cdac_i: byte_at(d, 0)? as i8,
                cdac_q: byte_at(d, 1)? as i8,
                rx_atten: byte_at(d, 2)?,
                flags: byte_at(d, 3)?,
                residue_i: le_i32_at(d, 4)?,
                residue_q: le_i32_at(d, 8)?,
            }),
            T::Debug => PacketData::Debug {
                payload_len: le_u32_at(d, 0)?,
            },
        })
    }

    pub fn packet_type(&self) -> EventPacketType {
        use EventPacketType as T;
        match self {
            PacketData::TxRampUp(_) => T::TxRampUp,
            PacketData::TxRampDown(_) => T::TxRampDown,
            PacketData::InventoryRoundSummary(_) => T::InventoryRoundSummary,
            PacketData::QChanged(_) => T::QChanged,
            PacketData::TagRead(_) => T::TagRead,
            PacketData::TagReadExtended(_) => T::TagReadExtended,
            PacketData::Gen2Transaction(_) => T::Gen2Transaction,
            PacketData::ContinuousInventorySummary(_) => T::ContinuousInventorySummary,
            PacketData::HelloWorld(_) => T::HelloWorld,
            PacketData::Custom { .. } => T::Custom,
            PacketData::PowerControlLoopSummary(_) => T::PowerControlLoopSummary,
            PacketData::AggregateOpSummary(_) => T::AggregateOpSummary,
            PacketData::Halted(_) => T::Halted,
            PacketData::InvalidPacket => T::InvalidPacket,
            PacketData::FifoOverflow(_) => T::FifoOverflowPacket,
            PacketData::Ex10Result(_) => T::Ex10ResultPacket,
            PacketData::SjcMeasurement(_) => T::SjcMeasurement,
            PacketData::Debug { .. } => T::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_world_bytes(us: u32) -> Vec<u8> {
        let mut header = make_packet_header(EventPacketType::HelloWorld);
        header.us_counter = us;
        let mut v = header.to_bytes().to_vec();
        v.extend_from_slice(&[0x10, 0x00, 0x01, 0x00]);
        v
    }

    #[test]
    fn header_layout() {
        let h = make_packet_header(EventPacketType::AggregateOpSummary);
        assert_eq!(h.packet_length, 6);
        assert_eq!(h.to_bytes(), [6, 0x0d, 0x4b, 0xbf, 0, 0, 0, 0]);
        assert_eq!(PacketHeader::from_bytes(&h.to_bytes()).unwrap(), h);
    }

    #[test]
    fn static_sizes() {
        assert_eq!(EventPacketType::TagReadExtended.static_size(), 20);
        assert_eq!(EventPacketType::Ex10ResultPacket.static_size(), 8);
        assert_eq!(get_static_payload_length(0x0c), 0);
        assert!(!EventPacketType::InvalidPacket.is_valid());
    }

    #[test]
    fn parse_advances_over_packets() {
        let mut buf = hello_world_bytes(7);
        buf.extend(hello_world_bytes(9));
        let mut cursor = buf.as_slice();
        let a = parse_event_packet(&mut cursor);
        assert!(a.is_valid);
        assert_eq!(a.us_counter, 7);
        assert_eq!(cursor.len(), 12);
        let b = parse_event_packet(&mut cursor);
        assert_eq!(b.us_counter, 9);
        assert!(cursor.is_empty());
        match b.data().unwrap() {
            PacketData::HelloWorld(hw) => {
                assert_eq!(hw.sku, 0x0010);
                assert_eq!(hw.reset_reason, 1);
            }
            other => panic!("expected HelloWorld, got: {:?}", other),
        }
    }

    #[test]
    fn bad_sha_skips_rest_of_buffer() {
        let mut buf = hello_world_bytes(0);
        buf[2] = 0x00;
        buf.extend(hello_world_bytes(1));
        let mut cursor = buf.as_slice();
        let p = parse_event_packet(&mut cursor);
        assert!(!p.is_valid);
        assert_eq!(p.packet_type, EventPacketType::InvalidPacket);
        assert!(cursor.is_empty());
    }

    #[test]
    fn length_past_buffer_is_invalid() {
        let mut buf = hello_world_bytes(0);
        buf[0] = 4;
        let mut cursor = buf.as_slice();
        assert!(!parse_event_packet(&mut cursor).is_valid);

        let mut short: &[u8] = &[0x03, 0x09, 0x4b];
        assert!(!parse_event_packet(&mut short).is_valid);
        assert!(short.is_empty());
    }

    #[test]
    fn dynamic_data_and_padding() {
        let txn = Gen2Transaction {
            transaction_id: 3,
            status: 1,
            num_bits: 16,
            ..Default::default()
        };
        let packet = make_gen2_transaction_packet(txn, &[0xab, 0xcd, 0xef]);
        let bytes = create_fifo_event(&packet).unwrap();
        // 8 + 12 + 3 rounds up to 24
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[0], 6);
        assert_eq!(bytes[23], 0);

        let mut cursor = bytes.as_slice();
        let parsed = parse_event_packet(&mut cursor);
        assert_eq!(parsed.dynamic_data, vec![0xab, 0xcd, 0xef, 0x00]);
        match parsed.data().unwrap() {
            PacketData::Gen2Transaction(t) => assert_eq!(t, txn),
            other => panic!("expected Gen2Transaction, got: {:?}", other),
        }
    }

    #[test]
    fn result_packet_round_trip() {
        let record = Error::NoFreeBuffers.to_result_record();
        let bytes = make_result_packet_bytes(&record, 0x1234);
        let mut cursor = &bytes[..];
        let p = parse_event_packet(&mut cursor);
        assert_eq!(p.packet_type, EventPacketType::Ex10ResultPacket);
        assert_eq!(p.us_counter, 0x1234);
        assert_eq!(p.data().unwrap(), PacketData::Ex10Result(record));
    }

    #[test]
    fn aggregate_summary_layout() {
        let s = AggregateOpSummary {
            op_run_count: 2,
            final_buffer_byte_index: 0x0102,
            last_inner_op_error: 5,
            identifier: 0xbeef,
            ..Default::default()
        };
        let bytes = s.to_bytes();
        assert_eq!(&bytes[6..8], &[0x02, 0x01]);
        assert_eq!(bytes[11], 5);
        assert_eq!(
            PacketData::from_bytes(EventPacketType::AggregateOpSummary, &bytes).unwrap(),
            PacketData::AggregateOpSummary(s)
        );
    }
}
