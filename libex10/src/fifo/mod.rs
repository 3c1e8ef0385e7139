// libex10-rs/libex10/src/fifo/mod.rs

//! Host side of the device event fifo: buffer pools, the queue of filled
//! buffers, and the packet format carried in them.

pub mod buffer;
pub mod list;
pub mod packet;
pub mod queue;
pub mod tag_read;

pub use buffer::{FifoBufferList, FifoBufferNode, FifoBufferPools, PoolKind};
pub use list::{LinkedList, NodeId};
pub use packet::*;
pub use queue::EventFifoQueue;
pub use tag_read::{get_tag_read_fields, TagReadFields, TagReadType, TID_LENGTH_BYTES};
