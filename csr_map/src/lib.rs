//! # CSR Address Maps
//!
//! This small library contains the types and file format logic for CSR address map
//! artifacts. An address map is produced once at SoC composition time and is the
//! contract a remote client consumes to translate register names into bus addresses.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod csv;

use kstring::KString;
use std::collections::HashMap;

/// The number of bytes in one bus word
pub const WORD_BYTES: u32 = 4;

/// The access mode of a CSR from the point of view of the bus
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Reads return a value, writes are rejected
    ReadOnly,
    /// Writes take effect, reads are rejected
    WriteOnly,
    /// Both directions are valid
    ReadWrite,
}

impl AccessMode {
    #[must_use]
    pub fn readable(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    #[must_use]
    pub fn writable(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }

    /// The mode column string used in csr.csv files
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "ro",
            AccessMode::WriteOnly => "wo",
            AccessMode::ReadWrite => "rw",
        }
    }
}

/// A single named CSR: its byte address, width in bus words, and access mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CsrRegister {
    /// Byte address of the first word, always word-aligned
    pub addr: u32,
    /// Width in bus words
    pub words: u32,
    pub mode: AccessMode,
}

impl CsrRegister {
    /// Size of this register in bytes
    #[must_use]
    pub fn size_bytes(&self) -> u32 {
        self.words * WORD_BYTES
    }
}

/// The full composition-time artifact: peripheral bank bases, the flat register
/// list, and free-form constants (ident string, sampling cadence, etc.)
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CsrMap {
    /// Peripheral name to bank base address
    pub banks: HashMap<KString, u32>,
    /// Fully qualified register name (`<periph>_<reg>`) to its description
    pub registers: HashMap<KString, CsrRegister>,
    /// Named constants carried alongside the map
    pub constants: HashMap<KString, String>,
}

impl CsrMap {
    /// Look up a register by name
    #[must_use]
    pub fn register(&self, name: &str) -> Option<&CsrRegister> {
        self.registers.get(name)
    }

    /// Look up a constant by name
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants.get(name).map(String::as_str)
    }
}
