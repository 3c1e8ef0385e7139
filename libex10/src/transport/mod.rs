// libex10-rs/libex10/src/transport/mod.rs

pub mod mock;
pub mod traits;

pub use mock::MockTransport;
pub use traits::RegisterTransport;
