// libex10-rs/libex10/src/lib.rs

//! libex10
//!
//! Pure Rust host side core for Ex10 series RFID reader chips: Gen2
//! command encoding, the transmit command table, aggregate op buffers and
//! the event fifo queue.
#![warn(missing_docs)]

mod macros;

pub mod aggregate;
pub mod constants;
pub mod error;
pub mod fifo;
pub mod prelude;
pub mod protocol;
pub mod registers;
pub mod test_support;
pub mod transport;
pub mod tx_command;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`
// and `BitSpan` are available for consumers and for the `prelude`.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
