// libex10-rs/libex10/src/fifo/buffer.rs

//! Fixed pools of event fifo buffers.
//!
//! Every node belongs to exactly one of two pools for its whole life. The
//! pool is recovered from the size of the node's storage alone: result
//! nodes hold `RESULT_FIFO_BUFFER_SIZE_BYTES`, event nodes hold at least
//! `EX10_EVENT_FIFO_SIZE`.

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::constants::{
    EVENT_FIFO_BUFFER_COUNT, EX10_EVENT_FIFO_SIZE, FIFO_HEADER_SPACE, RESULT_FIFO_BUFFER_COUNT,
    RESULT_FIFO_BUFFER_SIZE_BYTES,
};
use crate::fifo::list::LinkedList;
use crate::fifo::packet::make_result_packet_bytes;
use crate::{Error, Result};

/// A buffer plus the number of fifo bytes it currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FifoBufferNode {
    raw: Vec<u8>,
    fifo_len: usize,
}

impl FifoBufferNode {
    fn new(raw: Vec<u8>) -> Self {
        Self { raw, fifo_len: 0 }
    }

    /// Size of the backing storage. Decides pool membership.
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Bytes of fifo data currently held.
    pub fn fifo_len(&self) -> usize {
        self.fifo_len
    }

    /// Bytes read from the device fifo.
    pub fn fifo_data(&self) -> &[u8] {
        &self.raw[..self.fifo_len]
    }

    /// Whole backing storage, for transports that read straight into it.
    /// Follow with [`set_fifo_len`](Self::set_fifo_len).
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.raw
    }

    /// Mark the first `len` bytes as fifo data. Fails past the buffer size.
    pub fn set_fifo_len(&mut self, len: usize) -> Result<()> {
        if len > self.raw.len() {
            return Err(Error::InvalidLength {
                expected: self.raw.len(),
                actual: len,
            });
        }
        self.fifo_len = len;
        Ok(())
    }

    /// Copy `data` to the start of the buffer and mark it as fifo content.
    pub fn fill(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.raw.len() {
            return Err(Error::InvalidLength {
                expected: self.raw.len(),
                actual: data.len(),
            });
        }
        self.raw[..data.len()].copy_from_slice(data);
        self.fifo_len = data.len();
        Ok(())
    }
}

/// Which pool a buffer list serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Event,
    Result,
}

/// Free list of one pool.
#[derive(Debug)]
pub struct FifoBufferList {
    kind: PoolKind,
    free: Mutex<LinkedList<FifoBufferNode>>,
}

impl FifoBufferList {
    /// Event pool. Each buffer loses `FIFO_HEADER_SPACE` bytes and is cut
    /// to a multiple of 4; what remains must hold a whole device fifo.
    pub fn new_event_list(buffers: Vec<Vec<u8>>) -> Result<Self> {
        let min = EX10_EVENT_FIFO_SIZE + FIFO_HEADER_SPACE;
        Self::build(PoolKind::Event, buffers, |mut buffer| {
            let usable = buffer
                .len()
                .checked_sub(FIFO_HEADER_SPACE)
                .map(|len| len / 4 * 4)
                .unwrap_or(0);
            if usable < EX10_EVENT_FIFO_SIZE {
                error!("event fifo buffer of {} bytes is below {}", buffer.len(), min);
                return Err(Error::InvalidLength {
                    expected: min,
                    actual: buffer.len(),
                });
            }
            buffer.truncate(usable);
            Ok(buffer)
        })
    }

    /// Result pool; each buffer holds one `Ex10ResultPacket`.
    pub fn new_result_list(buffers: Vec<Vec<u8>>) -> Result<Self> {
        Self::build(PoolKind::Result, buffers, |mut buffer| {
            if buffer.len() < RESULT_FIFO_BUFFER_SIZE_BYTES {
                error!(
                    "result fifo buffer of {} bytes is below {}",
                    buffer.len(),
                    RESULT_FIFO_BUFFER_SIZE_BYTES
                );
                return Err(Error::InvalidLength {
                    expected: RESULT_FIFO_BUFFER_SIZE_BYTES,
                    actual: buffer.len(),
                });
            }
            buffer.truncate(RESULT_FIFO_BUFFER_SIZE_BYTES);
            Ok(buffer)
        })
    }

    fn build<F>(kind: PoolKind, buffers: Vec<Vec<u8>>, mut shape: F) -> Result<Self>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>>,
    {
        if buffers.is_empty() {
            return Err(Error::NullPointer("fifo buffers"));
        }
        let mut list = LinkedList::with_capacity(buffers.len());
        for buffer in buffers {
            list.push_back(FifoBufferNode::new(shape(buffer)?));
        }
        Ok(Self {
            kind,
            free: Mutex::new(list),
        })
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Take a free buffer, if any is left.
    pub fn free_list_get(&self) -> Option<FifoBufferNode> {
        self.free.lock().pop_front()
    }

    /// Return a node and report whether the list was empty before.
    pub fn free_list_put(&self, mut node: FifoBufferNode) -> bool {
        node.fifo_len = 0;
        let mut free = self.free.lock();
        let was_empty = free.is_empty();
        free.push_back(node);
        was_empty
    }

    /// Free buffers left.
    pub fn free_list_size(&self) -> usize {
        self.free.lock().count()
    }
}

/// The event and result pools together.
#[derive(Debug)]
pub struct FifoBufferPools {
    pub event: FifoBufferList,
    pub result: FifoBufferList,
}

impl FifoBufferPools {
    pub fn new(event: FifoBufferList, result: FifoBufferList) -> Self {
        Self { event, result }
    }

    /// 8 event buffers sized for a full device fifo and 4 result buffers.
    pub fn with_default_sizes() -> Result<Self> {
        let event = (0..EVENT_FIFO_BUFFER_COUNT)
            .map(|_| vec![0u8; EX10_EVENT_FIFO_SIZE + FIFO_HEADER_SPACE])
            .collect();
        let result = (0..RESULT_FIFO_BUFFER_COUNT)
            .map(|_| vec![0u8; RESULT_FIFO_BUFFER_SIZE_BYTES])
            .collect();
        Ok(Self::new(
            FifoBufferList::new_event_list(event)?,
            FifoBufferList::new_result_list(result)?,
        ))
    }

    /// Put `node` back on the list it came from.
    ///
    /// Returns `true` only when an event node went back onto an empty event
    /// list, i.e. the producer may have stalled for lack of buffers.
    pub fn release_buffer_node(&self, node: FifoBufferNode) -> bool {
        if node.raw_len() == RESULT_FIFO_BUFFER_SIZE_BYTES {
            self.result.free_list_put(node);
            false
        } else {
            self.event.free_list_put(node)
        }
    }

    /// Take a result node and write an `Ex10ResultPacket` describing
    /// `err` into it. `None` when the result pool is exhausted.
    pub fn make_result_fifo_packet(&self, err: &Error, us_counter: u32) -> Option<FifoBufferNode> {
        let Some(mut node) = self.result.free_list_get() else {
            warn!("no result fifo buffer left to report: {}", err);
            return None;
        };
        let bytes = make_result_packet_bytes(&err.to_result_record(), us_counter);
        match node.fill(&bytes) {
            Ok(()) => {
                debug!("result packet queued for: {}", err);
                Some(node)
            }
            Err(e) => {
                error!("result packet does not fit its buffer: {}", e);
                self.result.free_list_put(node);
                None
            }
        }
    }
}
