// libex10-rs/libex10/src/utils/mod.rs

//! Small helpers shared by the printers and the event fifo queue: hex
//! formatting of register and fifo bytes, and time conversions.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
