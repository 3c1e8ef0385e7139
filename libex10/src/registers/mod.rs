// libex10-rs/libex10/src/registers/mod.rs

//! Device register descriptors, op identifiers and typed field images.

pub mod fields;
pub mod map;
pub mod ops;

pub use fields::*;
pub use map::*;
pub use ops::{OpId, OpsStatus, OpsStatusFields};

/// Host side access permitted on a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RegisterAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Register descriptor: `num_entries` consecutive entries of `length` bytes
/// starting at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisterInfo {
    pub name: &'static str,
    pub address: u16,
    pub length: u16,
    pub num_entries: u8,
    pub access: RegisterAccess,
}

impl RegisterInfo {
    pub const fn new(
        name: &'static str,
        address: u16,
        length: u16,
        num_entries: u8,
        access: RegisterAccess,
    ) -> Self {
        Self {
            name,
            address,
            length,
            num_entries,
            access,
        }
    }

    /// Bytes covered by all entries.
    pub const fn total_len(&self) -> usize {
        self.length as usize * self.num_entries as usize
    }

    /// Descriptor covering `count` entries starting at entry `first`.
    pub fn entries(&self, first: u8, count: u8) -> crate::Result<Self> {
        if u16::from(first) + u16::from(count) > u16::from(self.num_entries) {
            return Err(crate::Error::BadParamValue(format!(
                "{} has {} entries, requested {}..{}",
                self.name,
                self.num_entries,
                first,
                u16::from(first) + u16::from(count)
            )));
        }
        Ok(Self {
            address: self.address + u16::from(first) * self.length,
            num_entries: count,
            ..*self
        })
    }
}

/// Find the register whose first entry sits at `address`.
pub fn register_lookup_by_address(address: u16) -> Option<&'static RegisterInfo> {
    ALL_REGISTERS.iter().find(|reg| reg.address == address)
}
