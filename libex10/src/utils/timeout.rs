// libex10-rs/libex10/src/utils/timeout.rs

//! Time helpers for fifo waits and packet timestamps.

use std::time::{Duration, Instant};

/// Default wait used by callers polling the event fifo queue.
pub const DEFAULT_PACKET_WAIT_MS: u64 = 1000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convert microseconds to Duration.
pub fn us(us: u64) -> Duration {
    Duration::from_micros(us)
}

pub fn default_packet_wait() -> Duration {
    ms(DEFAULT_PACKET_WAIT_MS)
}

/// Microseconds elapsed since `start`, wrapping like the device's 32-bit
/// counter.
pub fn us_since(start: Instant) -> u32 {
    start.elapsed().as_micros() as u32
}
