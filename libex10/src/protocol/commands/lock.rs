// libex10-rs/libex10/src/protocol/commands/lock.rs

use super::{Gen2CommandType, command_reader, command_writer};
use crate::protocol::bits::{BitReader, BitWriter};
use crate::types::BitSpan;
use crate::Result;

/// Lock payload: ten mask bits followed by the ten matching action bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockCommandArgs {
    pub kill_password_read_write_mask: bool,
    pub kill_password_permalock_mask: bool,
    pub access_password_read_write_mask: bool,
    pub access_password_permalock_mask: bool,
    pub epc_memory_write_mask: bool,
    pub epc_memory_permalock_mask: bool,
    pub tid_memory_write_mask: bool,
    pub tid_memory_permalock_mask: bool,
    pub file_0_memory_write_mask: bool,
    pub file_0_memory_permalock_mask: bool,
    pub kill_password_read_write_lock: bool,
    pub kill_password_permalock: bool,
    pub access_password_read_write_lock: bool,
    pub access_password_permalock: bool,
    pub epc_memory_write_lock: bool,
    pub epc_memory_permalock: bool,
    pub tid_memory_write_lock: bool,
    pub tid_memory_permalock: bool,
    pub file_0_memory_write_lock: bool,
    pub file_0_memory_permalock: bool,
}

const LOCK_PAYLOAD_BITS: usize = 20;

impl LockCommandArgs {
    fn fields(&self) -> [bool; LOCK_PAYLOAD_BITS] {
        [
            self.kill_password_read_write_mask,
            self.kill_password_permalock_mask,
            self.access_password_read_write_mask,
            self.access_password_permalock_mask,
            self.epc_memory_write_mask,
            self.epc_memory_permalock_mask,
            self.tid_memory_write_mask,
            self.tid_memory_permalock_mask,
            self.file_0_memory_write_mask,
            self.file_0_memory_permalock_mask,
            self.kill_password_read_write_lock,
            self.kill_password_permalock,
            self.access_password_read_write_lock,
            self.access_password_permalock,
            self.epc_memory_write_lock,
            self.epc_memory_permalock,
            self.tid_memory_write_lock,
            self.tid_memory_permalock,
            self.file_0_memory_write_lock,
            self.file_0_memory_permalock,
        ]
    }

    fn from_fields(f: [bool; LOCK_PAYLOAD_BITS]) -> Self {
        Self {
            kill_password_read_write_mask: f[0],
            kill_password_permalock_mask: f[1],
            access_password_read_write_mask: f[2],
            access_password_permalock_mask: f[3],
            epc_memory_write_mask: f[4],
            epc_memory_permalock_mask: f[5],
            tid_memory_write_mask: f[6],
            tid_memory_permalock_mask: f[7],
            file_0_memory_write_mask: f[8],
            file_0_memory_permalock_mask: f[9],
            kill_password_read_write_lock: f[10],
            kill_password_permalock: f[11],
            access_password_read_write_lock: f[12],
            access_password_permalock: f[13],
            epc_memory_write_lock: f[14],
            epc_memory_permalock: f[15],
            tid_memory_write_lock: f[16],
            tid_memory_permalock: f[17],
            file_0_memory_write_lock: f[18],
            file_0_memory_permalock: f[19],
        }
    }

    fn write_fields(&self, w: &mut BitWriter) -> Result<()> {
        for bit in self.fields() {
            w.put_bool(bit)?;
        }
        Ok(())
    }

    fn read_fields(r: &mut BitReader<'_>) -> Result<Self> {
        let mut f = [false; LOCK_PAYLOAD_BITS];
        for bit in f.iter_mut() {
            *bit = r.get_bool()?;
        }
        Ok(Self::from_fields(f))
    }
}

/// Encode a Lock (opcode 0xC5).
pub fn encode_lock(args: &LockCommandArgs) -> Result<BitSpan> {
    let (opcode, opcode_bits) = Gen2CommandType::Lock.opcode();
    let mut w = command_writer(opcode_bits + LOCK_PAYLOAD_BITS)?;
    w.put(opcode, opcode_bits)?;
    args.write_fields(&mut w)?;
    w.finish()
}

pub fn decode_lock(encoded: &BitSpan) -> Result<LockCommandArgs> {
    let mut r = command_reader(encoded, Gen2CommandType::Lock)?;
    LockCommandArgs::read_fields(&mut r)
}
