// libex10-rs/libex10/src/transport/mock.rs

use crate::registers::RegisterInfo;
use crate::transport::traits::RegisterTransport;
use crate::{Error, Result};

const ADDRESS_SPACE: usize = 0x1_0000;

/// Mock transport for unit tests. Backs every register with a flat byte
/// array and records each write and fifo insertion.
#[derive(Debug, Clone)]
pub struct MockTransport {
    pub memory: Vec<u8>,
    /// (address, bytes) of every write, in order.
    pub writes: Vec<(u16, Vec<u8>)>,
    /// Addresses of every read, in order.
    pub reads: Vec<u16>,
    /// (trigger_irq, packet) of every insert_fifo_event call that succeeded.
    pub fifo_events: Vec<(bool, Option<Vec<u8>>)>,
    /// Testing hook: number of insert_fifo_event calls that should fail
    pub insert_fifo_failures: usize,
    /// Testing hook: number of writes that should fail
    pub write_failures: usize,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            memory: vec![0u8; ADDRESS_SPACE],
            writes: Vec::new(),
            reads: Vec::new(),
            fifo_events: Vec::new(),
            insert_fifo_failures: 0,
            write_failures: 0,
        }
    }
}

impl MockTransport {
    /// Zeroed device memory and empty logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload device memory without recording a write.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let start = usize::from(address);
        let end = (start + data.len()).min(ADDRESS_SPACE);
        self.memory[start..end].copy_from_slice(&data[..end - start]);
    }

    /// Current contents of `reg`.
    pub fn peek(&self, reg: &RegisterInfo) -> &[u8] {
        let start = usize::from(reg.address);
        &self.memory[start..start + reg.total_len()]
    }

    /// Bytes of the last write to `address`, if any.
    pub fn last_write_to(&self, address: u16) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(addr, _)| *addr == address)
            .map(|(_, data)| data.as_slice())
    }

    pub fn set_insert_fifo_failures(&mut self, n: usize) {
        self.insert_fifo_failures = n;
    }

    fn store(&mut self, address: u16, data: &[u8]) -> Result<()> {
        if self.write_failures > 0 {
            self.write_failures -= 1;
            return Err(Error::HostInterface(format!(
                "injected write failure at {:#06x}",
                address
            )));
        }
        let start = usize::from(address);
        if start + data.len() > ADDRESS_SPACE {
            return Err(Error::InvalidLength {
                expected: ADDRESS_SPACE - start,
                actual: data.len(),
            });
        }
        self.memory[start..start + data.len()].copy_from_slice(data);
        self.writes.push((address, data.to_vec()));
        Ok(())
    }
}

impl RegisterTransport for MockTransport {
    fn read(&mut self, reg: &RegisterInfo) -> Result<Vec<u8>> {
        self.reads.push(reg.address);
        Ok(self.peek(reg).to_vec())
    }

    fn write(&mut self, reg: &RegisterInfo, data: &[u8]) -> Result<()> {
        if data.len() > reg.total_len() {
            return Err(Error::InvalidLength {
                expected: reg.total_len(),
                actual: data.len(),
            });
        }
        self.store(reg.address, data)
    }

    fn write_partial(&mut self, address: u16, length: u16, data: &[u8]) -> Result<()> {
        let bytes = data.get(..usize::from(length)).ok_or(Error::InvalidLength {
            expected: usize::from(length),
            actual: data.len(),
        })?;
        self.store(address, bytes)
    }

    fn insert_fifo_event(&mut self, trigger_irq: bool, packet: Option<&[u8]>) -> Result<()> {
        if self.insert_fifo_failures > 0 {
            self.insert_fifo_failures -= 1;
            return Err(Error::Timeout);
        }
        self.fifo_events.push((trigger_irq, packet.map(<[u8]>::to_vec)));
        Ok(())
    }
}
