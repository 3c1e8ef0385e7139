// libex10-rs/libex10/src/transport/traits.rs

use crate::registers::RegisterInfo;
use crate::Result;

/// Register level access to the device.
///
/// The host interface framing (SPI, response codes, retries) lives behind
/// this trait; the core only issues reads and writes against named register
/// descriptors.
pub trait RegisterTransport {
    /// Read every entry of `reg`. The returned buffer is `reg.total_len()`
    /// bytes long.
    fn read(&mut self, reg: &RegisterInfo) -> Result<Vec<u8>>;

    /// Write `data` starting at the first entry of `reg`. `data` may be
    /// shorter than the register.
    fn write(&mut self, reg: &RegisterInfo, data: &[u8]) -> Result<()>;

    /// Read several registers in order. Default implementation issues one
    /// `read` per register.
    fn read_multiple(&mut self, regs: &[RegisterInfo]) -> Result<Vec<Vec<u8>>> {
        regs.iter().map(|reg| self.read(reg)).collect()
    }

    /// Write several registers in order. Not atomic across registers.
    fn write_multiple(&mut self, writes: &[(RegisterInfo, &[u8])]) -> Result<()> {
        for (reg, data) in writes {
            self.write(reg, data)?;
        }
        Ok(())
    }

    /// Write `length` bytes of `data` at a raw address.
    fn write_partial(&mut self, address: u16, length: u16, data: &[u8]) -> Result<()>;

    /// Ask the device to push `packet` (or an empty marker when `None`) into
    /// its event fifo, optionally raising the host interrupt.
    fn insert_fifo_event(&mut self, trigger_irq: bool, packet: Option<&[u8]>) -> Result<()>;
}
