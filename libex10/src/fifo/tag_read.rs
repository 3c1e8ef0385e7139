// libex10-rs/libex10/src/fifo/tag_read.rs

//! Splits the dynamic data of a TagRead packet into its Gen2 fields.
//!
//! Layouts by read type:
//!
//! * `Epc`: `PC | [XPC_W1 [XPC_W2]] | EPC | StoredCRC`
//! * `EpcWithTid`: the Ack reply followed by a Read reply
//!   `Header | TID | Handle | CRC`
//! * `EpcWithFastIdTid`: Monza 4/5 send `PC | EPC | StoredCRC | TID | CRC`,
//!   newer tags send `PC | EPC | TID | CRC` with the PC length covering both.

use log::error;

use crate::macros::wire_enum;
use crate::protocol::parser::le_u16_at;
use crate::{Error, Result};

const PC_WORD_L_SHIFT: u16 = 3;
const PC_WORD_L_MASK: u16 = 0x001f;
const PC_WORD_XI: u16 = 0x02;
const XPC_W1_XEB: u16 = 0x80;

const WORD_BYTES: usize = 2;
pub const TID_LENGTH_BYTES: usize = 12;
const CRC_LENGTH_BYTES: usize = 2;
const GEN2_REPLY_HEADER_LENGTH_BYTES: usize = 1;
const GEN2_REPLY_HANDLE_LENGTH_BYTES: usize = 2;

/// Short TIDs (class, vendor, model) of Monza 4 and Monza 5 tags.
const MONZA_4_5_SHORT_TIDS: [u32; 7] = [
    0xE280_1100,
    0xE280_1104,
    0xE280_1105,
    0xE280_110C,
    0xE280_1114,
    0xE280_1130,
    0xE280_1132,
];

wire_enum! {
    /// `read_type` of a TagRead packet.
    pub enum TagReadType {
        Epc = 1,
        EpcWithTid = 2,
        EpcWithFastIdTid = 3,
    }
}

/// Fields located in a tag reply. Absent fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagReadFields {
    pub pc: u16,
    pub xpc_w1: Option<u16>,
    pub xpc_w2: Option<u16>,
    pub epc: Option<Vec<u8>>,
    pub stored_crc: Option<u16>,
    pub tid: Option<Vec<u8>>,
}

fn is_monza4_monza5(tid: &[u8]) -> bool {
    match tid.get(..4) {
        Some(short) => {
            let short_tid = u32::from_be_bytes([short[0], short[1], short[2], short[3]]);
            MONZA_4_5_SHORT_TIDS.contains(&short_tid)
        }
        None => false,
    }
}

fn copy_of(data: &[u8], offset: usize, len: usize) -> Option<Vec<u8>> {
    data.get(offset..offset + len).map(<[u8]>::to_vec)
}

/// Locate PC, XPC, EPC, stored CRC and TID in `data`.
///
/// Fails when `data` is shorter than the reply length announced by the PC
/// word (plus the Read reply for `EpcWithTid`).
pub fn get_tag_read_fields(
    data: &[u8],
    read_type: TagReadType,
    tid_offset: u8,
) -> Result<TagReadFields> {
    let pc = le_u16_at(data, 0)?;
    let mut pc_data_len = usize::from((pc >> PC_WORD_L_SHIFT) & PC_WORD_L_MASK) * WORD_BYTES;

    // PC + EPC + StoredCRC
    let mut min_len = pc_data_len + 2 * WORD_BYTES;
    if data.len() < min_len {
        error!(
            "Tag response length calculated from the PC is {} bytes, while received data length is {}",
            min_len,
            data.len()
        );
        return Err(Error::InvalidLength {
            expected: min_len,
            actual: data.len(),
        });
    }

    let mut fields = TagReadFields {
        pc,
        ..Default::default()
    };

    let mut xpc_len = 0;
    if pc & PC_WORD_XI != 0 {
        let w1 = le_u16_at(data, WORD_BYTES)?;
        fields.xpc_w1 = Some(w1);
        xpc_len += WORD_BYTES;
        if w1 & XPC_W1_XEB != 0 {
            fields.xpc_w2 = Some(le_u16_at(data, 2 * WORD_BYTES)?);
            xpc_len += WORD_BYTES;
        }
    }
    let epc_offset = WORD_BYTES + xpc_len;
    pc_data_len = pc_data_len.saturating_sub(xpc_len);

    let crc_at = |epc_len: usize| le_u16_at(data, epc_offset + epc_len).ok();

    let epc_len = match read_type {
        TagReadType::Epc => {
            fields.stored_crc = crc_at(pc_data_len);
            pc_data_len
        }
        TagReadType::EpcWithTid => {
            min_len += TID_LENGTH_BYTES
                + GEN2_REPLY_HEADER_LENGTH_BYTES
                + GEN2_REPLY_HANDLE_LENGTH_BYTES
                + CRC_LENGTH_BYTES;
            if data.len() < min_len {
                error!(
                    "Minimal length calculated from the PC is {} bytes, while received data length is {}",
                    min_len,
                    data.len()
                );
                return Err(Error::InvalidLength {
                    expected: min_len,
                    actual: data.len(),
                });
            }
            fields.stored_crc = crc_at(pc_data_len);
            fields.tid = copy_of(
                data,
                usize::from(tid_offset) + GEN2_REPLY_HEADER_LENGTH_BYTES,
                TID_LENGTH_BYTES,
            );
            pc_data_len
        }
        TagReadType::EpcWithFastIdTid => {
            let tid = copy_of(data, usize::from(tid_offset), TID_LENGTH_BYTES);
            let monza = tid.as_deref().is_some_and(is_monza4_monza5);
            match tid {
                Some(tid) if monza && pc_data_len >= TID_LENGTH_BYTES + CRC_LENGTH_BYTES => {
                    let epc_len = pc_data_len - TID_LENGTH_BYTES - CRC_LENGTH_BYTES;
                    fields.stored_crc = crc_at(epc_len);
                    fields.tid = Some(tid);
                    epc_len
                }
                Some(tid) if !monza && pc_data_len >= TID_LENGTH_BYTES => {
                    fields.tid = Some(tid);
                    pc_data_len - TID_LENGTH_BYTES
                }
                // unexpected length: report everything as EPC, no TID
                _ => {
                    fields.stored_crc = crc_at(pc_data_len);
                    pc_data_len
                }
            }
        }
    };

    if epc_len > 0 {
        fields.epc = copy_of(data, epc_offset, epc_len);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc_for_words(words: u16) -> [u8; 2] {
        (words << 3).to_le_bytes()
    }

    #[test]
    fn epc_only() {
        let mut data = pc_for_words(2).to_vec();
        data.extend_from_slice(&[0xe2, 0x00, 0x12, 0x34, 0xaa, 0xbb]);
        let f = get_tag_read_fields(&data, TagReadType::Epc, 0).unwrap();
        assert_eq!(f.epc, Some(vec![0xe2, 0x00, 0x12, 0x34]));
        assert_eq!(f.stored_crc, Some(0xbbaa));
        assert_eq!(f.tid, None);
        assert_eq!(f.xpc_w1, None);
    }

    #[test]
    fn reply_shorter_than_pc_length() {
        let mut data = pc_for_words(6).to_vec();
        data.extend_from_slice(&[0; 4]);
        assert!(matches!(
            get_tag_read_fields(&data, TagReadType::Epc, 0),
            Err(Error::InvalidLength { expected: 16, actual: 6 })
        ));
    }

    #[test]
    fn xpc_words_precede_epc() {
        // L = 3 words: XPC_W1, XPC_W2, one EPC word
        let pc = (3u16 << 3) | PC_WORD_XI;
        let mut data = pc.to_le_bytes().to_vec();
        data.extend_from_slice(&[0x80, 0x00, 0x01, 0x00, 0x55, 0x66, 0x00, 0x00]);
        let f = get_tag_read_fields(&data, TagReadType::Epc, 0).unwrap();
        assert_eq!(f.xpc_w1, Some(0x0080));
        assert_eq!(f.xpc_w2, Some(0x0001));
        assert_eq!(f.epc, Some(vec![0x55, 0x66]));
    }

    #[test]
    fn fast_id_newer_tag() {
        // L covers 2 EPC words plus the 6 TID words
        let mut data = pc_for_words(8).to_vec();
        data.extend_from_slice(&[0x30, 0x00, 0x00, 0x01]);
        let tid = [0xE2, 0x80, 0x11, 0x70, 1, 2, 3, 4, 5, 6, 7, 8];
        data.extend_from_slice(&tid);
        data.extend_from_slice(&[0x12, 0x34]);
        let f = get_tag_read_fields(&data, TagReadType::EpcWithFastIdTid, 6).unwrap();
        assert_eq!(f.epc, Some(vec![0x30, 0x00, 0x00, 0x01]));
        assert_eq!(f.tid, Some(tid.to_vec()));
        assert_eq!(f.stored_crc, None);
    }

    #[test]
    fn fast_id_monza() {
        // PC | EPC(2 words) | StoredCRC | TID(6 words) | CRC
        let mut data = pc_for_words(9).to_vec();
        data.extend_from_slice(&[0xab, 0xcd, 0xef, 0x01]);
        data.extend_from_slice(&[0x11, 0x22]);
        let tid = [0xE2, 0x80, 0x11, 0x05, 0, 0, 0, 0, 0, 0, 0, 9];
        data.extend_from_slice(&tid);
        data.extend_from_slice(&[0x00, 0x00]);
        let f = get_tag_read_fields(&data, TagReadType::EpcWithFastIdTid, 8).unwrap();
        assert_eq!(f.epc, Some(vec![0xab, 0xcd, 0xef, 0x01]));
        assert_eq!(f.stored_crc, Some(0x2211));
        assert_eq!(f.tid, Some(tid.to_vec()));
    }

    #[test]
    fn epc_with_tid_skips_read_header() {
        let mut data = pc_for_words(1).to_vec();
        data.extend_from_slice(&[0x77, 0x88, 0x00, 0x00]);
        // read reply: header, TID, handle, CRC
        data.push(0x00);
        let tid: Vec<u8> = (1..=12).collect();
        data.extend_from_slice(&tid);
        data.extend_from_slice(&[0, 0, 0, 0]);
        let f = get_tag_read_fields(&data, TagReadType::EpcWithTid, 6).unwrap();
        assert_eq!(f.epc, Some(vec![0x77, 0x88]));
        assert_eq!(f.tid, Some(tid));

        assert!(get_tag_read_fields(&data[..20], TagReadType::EpcWithTid, 6).is_err());
    }

    #[test]
    fn zero_length_epc() {
        let data = [0x00, 0x00, 0xaa, 0xbb];
        let f = get_tag_read_fields(&data, TagReadType::Epc, 0).unwrap();
        assert_eq!(f.epc, None);
        assert_eq!(f.stored_crc, Some(0xbbaa));
    }
}
