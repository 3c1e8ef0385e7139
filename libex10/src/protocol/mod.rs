// libex10-rs/libex10/src/protocol/mod.rs

pub mod bits;
pub mod commands;
pub mod ebv;
pub mod parser;
pub mod responses;
pub mod txn_controls;

pub use bits::{bit_pack, bit_pack_msb_bits, bit_unpack, bit_unpack_msb, BitReader, BitWriter};
pub use commands::*;
pub use ebv::{bit_pack_ebv, bit_unpack_ebv, ebv_length_decode, get_ebv_bit_len};
pub use responses::*;
pub use txn_controls::{get_gen2_tx_control_config, Gen2TxnControls, ResponseType};
