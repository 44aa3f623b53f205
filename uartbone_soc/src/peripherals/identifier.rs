//! The readable identity string: a block of read-only words spelling the
//! configured SoC ident, one ASCII byte per word, NUL-padded.

use crate::bus::{BusError, ConfigError, Peripheral, RegDef};
use csr_map::{AccessMode, WORD_BYTES};

/// Fixed block size in words; short idents are NUL-padded
pub const IDENT_WORDS: u32 = 64;

#[derive(Debug)]
pub struct Identifier {
    chars: Vec<u32>,
}

impl Identifier {
    /// # Errors
    /// Rejects idents longer than the block
    pub fn new(ident: &str) -> Result<Self, ConfigError> {
        if ident.len() > IDENT_WORDS as usize {
            return Err(ConfigError::IdentTooLong(ident.len()));
        }
        let mut chars: Vec<u32> = ident.bytes().map(u32::from).collect();
        chars.resize(IDENT_WORDS as usize, 0);
        Ok(Self { chars })
    }
}

impl Peripheral for Identifier {
    fn read(&self, offset: u32) -> Result<u32, BusError> {
        let word = offset / WORD_BYTES;
        self.chars
            .get(word as usize)
            .copied()
            .ok_or(BusError::UnmappedAddress(offset))
    }

    fn write(&mut self, offset: u32, _value: u32) -> Result<(), BusError> {
        let word = offset / WORD_BYTES;
        if (word as usize) < self.chars.len() {
            Err(BusError::ReadOnlyViolation(offset))
        } else {
            Err(BusError::UnmappedAddress(offset))
        }
    }

    fn regs(&self) -> Vec<RegDef> {
        vec![RegDef {
            name: "mem",
            word_offset: 0,
            words: IDENT_WORDS,
            mode: AccessMode::ReadOnly,
        }]
    }
}
