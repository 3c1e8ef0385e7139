// libex10-rs/libex10/src/fifo/queue.rs

//! Queue of filled event fifo buffers and the packet cursor over them.
//!
//! The producer (the interrupt side that reads the device fifo) pushes whole
//! nodes with [`EventFifoQueue::list_node_push_back`]. A single consumer
//! walks the packets with `packet_peek` / `packet_remove`. The node being
//! parsed is taken off the queued list and held by the cursor until its
//! bytes are used up, then it goes back to its pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};
use parking_lot::{Condvar, Mutex};

use crate::fifo::buffer::{FifoBufferNode, FifoBufferPools};
use crate::fifo::list::LinkedList;
use crate::fifo::packet::{parse_event_packet, EventFifoPacket};
use crate::transport::RegisterTransport;
use crate::utils::us_since;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct QueueState {
    queued: LinkedList<FifoBufferNode>,
    wake_pending: bool,
}

#[derive(Debug, Default)]
struct Cursor {
    node: Option<FifoBufferNode>,
    offset: usize,
    packet: Option<EventFifoPacket>,
}

impl Cursor {
    fn has_data(&self) -> bool {
        self.packet.is_some()
            || self
                .node
                .as_ref()
                .is_some_and(|node| self.offset < node.fifo_len())
    }
}

/// Queue of filled event fifo buffers shared by one producer and one consumer.
#[derive(Debug)]
pub struct EventFifoQueue {
    pools: Arc<FifoBufferPools>,
    state: Mutex<QueueState>,
    cond: Condvar,
    // only the consumer thread locks this
    cursor: Mutex<Cursor>,
    started: Instant,
}

impl EventFifoQueue {
    /// Empty queue that returns consumed buffers to `pools`.
    pub fn new(pools: Arc<FifoBufferPools>) -> Self {
        Self {
            pools,
            state: Mutex::new(QueueState::default()),
            cond: Condvar::new(),
            cursor: Mutex::new(Cursor::default()),
            started: Instant::now(),
        }
    }

    pub fn pools(&self) -> &Arc<FifoBufferPools> {
        &self.pools
    }

    /// Enqueue a filled node and wake the consumer.
    pub fn list_node_push_back(&self, node: FifoBufferNode) {
        let mut state = self.state.lock();
        state.queued.push_back(node);
        self.cond.notify_one();
    }

    /// Take an event buffer, copy `data` into it and enqueue it.
    pub fn push_fifo_data(&self, data: &[u8]) -> Result<()> {
        let mut node = self.pools.event.free_list_get().ok_or(Error::NoFreeBuffers)?;
        if let Err(e) = node.fill(data) {
            self.pools.event.free_list_put(node);
            return Err(e);
        }
        self.list_node_push_back(node);
        Ok(())
    }

    /// Nodes waiting behind the one being parsed.
    pub fn queued_count(&self) -> usize {
        self.state.lock().queued.count()
    }

    /// Current packet without consuming it. Repeated calls return the same
    /// packet until [`packet_remove`](Self::packet_remove).
    pub fn packet_peek<T: RegisterTransport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Option<EventFifoPacket> {
        let mut guard = self.cursor.lock();
        let cursor = &mut *guard;
        if cursor.packet.is_none() {
            self.advance(cursor, transport);
        }
        cursor.packet.clone()
    }

    /// Drop the current packet and move to the next one.
    pub fn packet_remove<T: RegisterTransport + ?Sized>(&self, transport: &mut T) {
        let mut guard = self.cursor.lock();
        self.advance(&mut guard, transport);
    }

    /// Block until a packet may be available or [`packet_unwait`](Self::packet_unwait)
    /// is called.
    pub fn packet_wait(&self) {
        if self.cursor.lock().has_data() {
            return;
        }
        let mut state = self.state.lock();
        while state.queued.is_empty() && !state.wake_pending {
            self.cond.wait(&mut state);
        }
        state.wake_pending = false;
    }

    /// Like [`packet_wait`](Self::packet_wait) but gives up after `timeout`.
    /// Returns `true` when the wait expired with nothing to read.
    pub fn packet_wait_with_timeout(&self, timeout: Duration) -> bool {
        if self.cursor.lock().has_data() {
            return false;
        }
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.queued.is_empty() && !state.wake_pending {
            if self.cond.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        let expired = state.queued.is_empty() && !state.wake_pending;
        state.wake_pending = false;
        expired
    }

    /// Wake a blocked consumer without queuing anything.
    pub fn packet_unwait(&self) {
        let mut state = self.state.lock();
        state.wake_pending = true;
        self.cond.notify_all();
    }

    fn advance<T: RegisterTransport + ?Sized>(&self, cursor: &mut Cursor, transport: &mut T) {
        let exhausted = cursor
            .node
            .as_ref()
            .is_none_or(|node| cursor.offset >= node.fifo_len());
        if exhausted {
            if let Some(node) = cursor.node.take() {
                self.release_node(node, transport);
            }
            cursor.node = self.state.lock().queued.pop_front();
            cursor.offset = 0;
        }

        cursor.packet = match cursor.node.as_ref() {
            Some(node) if cursor.offset < node.fifo_len() => {
                let remaining = &node.fifo_data()[cursor.offset..];
                let mut rest = remaining;
                let packet = parse_event_packet(&mut rest);
                cursor.offset += remaining.len() - rest.len();
                Some(packet)
            }
            _ => None,
        };
    }

    fn release_node<T: RegisterTransport + ?Sized>(&self, node: FifoBufferNode, transport: &mut T) {
        if !self.pools.release_buffer_node(node) {
            return;
        }
        // the producer may be stalled waiting for a buffer
        debug!("event free list was empty, requesting a fifo interrupt");
        if let Err(err) = transport.insert_fifo_event(true, None) {
            error!("failed to request an event fifo interrupt: {}", err);
            if let Some(result) = self
                .pools
                .make_result_fifo_packet(&err, us_since(self.started))
            {
                self.list_node_push_back(result);
            }
        }
    }
}
