//! The internal CSR bus: one master, many addressable peripherals.
//!
//! Address decoding is a pure range lookup over a table validated once at
//! composition time. The fabric takes `&mut self` for every transaction, so
//! exactly one transaction is ever in flight and a read always observes the
//! write issued before it.

use csr_map::{AccessMode, WORD_BYTES};
use kstring::KString;
use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};
use thiserror::Error;
use tracing::warn;

/// Errors a bus transaction can complete with. These are never transported over
/// the serial wire; the bridge drops the transaction and the host infers
/// rejection by timeout.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("No peripheral decodes address 0x{0:08x}")]
    UnmappedAddress(u32),
    #[error("Access direction not supported by the register at 0x{0:08x}")]
    ReadOnlyViolation(u32),
}

/// Composition-time configuration errors. These are fatal at build and can
/// never occur at run time.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Peripheral `{name}` at 0x{base:08x} overlaps `{other}`")]
    Overlap {
        name: String,
        base: u32,
        other: String,
    },
    #[error("Peripheral base 0x{0:08x} is not word aligned")]
    Misaligned(u32),
    #[error("Peripheral `{name}` wants {lines} IO lines, more than one bus word")]
    TooManyLines { name: String, lines: u32 },
    #[error("Identity string of {0} bytes doesn't fit the identifier block")]
    IdentTooLong(usize),
}

/// Description of one register within a peripheral's bank, used to build the
/// composition-time address map
#[derive(Debug, Copy, Clone)]
pub struct RegDef {
    /// Name within the bank (the map prefixes the peripheral name)
    pub name: &'static str,
    /// Offset from the bank base, in words
    pub word_offset: u32,
    /// Width in words
    pub words: u32,
    pub mode: AccessMode,
}

/// A bus slave: a named collection of registers sharing an address-decode
/// prefix. Peripherals see bank-relative byte offsets; the fabric owns the
/// absolute addressing.
pub trait Peripheral: Debug {
    /// Complete a one-word read at `offset` bytes into this bank
    /// # Errors
    /// [`BusError::ReadOnlyViolation`] for write-only registers,
    /// [`BusError::UnmappedAddress`] for offsets with no register
    fn read(&self, offset: u32) -> Result<u32, BusError>;

    /// Complete a one-word write at `offset` bytes into this bank
    /// # Errors
    /// [`BusError::ReadOnlyViolation`] for read-only registers,
    /// [`BusError::UnmappedAddress`] for offsets with no register
    fn write(&mut self, offset: u32, value: u32) -> Result<(), BusError>;

    /// The register layout of this bank
    fn regs(&self) -> Vec<RegDef>;

    /// Advance autonomous peripheral-internal state by one discrete step.
    /// Most peripherals have none.
    fn tick(&mut self) {}

    /// Return all registers to their design-time defaults
    fn reset(&mut self) {}
}

#[derive(Debug)]
struct Slave {
    name: KString,
    base: u32,
    size: u32,
    dev: Box<dyn Peripheral>,
}

/// The address-routed transport connecting the bridge to the peripherals
#[derive(Debug, Default)]
pub struct BusFabric {
    slaves: Vec<Slave>,
    errors: Arc<AtomicU32>,
}

impl BusFabric {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter of completed bus errors, bumped on every failed
    /// transaction (exposed by the SoC control block)
    #[must_use]
    pub fn error_counter(&self) -> Arc<AtomicU32> {
        self.errors.clone()
    }

    /// Attach a peripheral at `base`. The bank size is derived from the
    /// peripheral's register layout.
    /// # Errors
    /// Rejects misaligned bases and any range overlap with an already attached
    /// peripheral
    pub fn attach(
        &mut self,
        name: &str,
        base: u32,
        dev: Box<dyn Peripheral>,
    ) -> Result<(), ConfigError> {
        if base % WORD_BYTES != 0 {
            return Err(ConfigError::Misaligned(base));
        }
        let words = dev
            .regs()
            .iter()
            .map(|r| r.word_offset + r.words)
            .max()
            .unwrap_or(0);
        let size = words * WORD_BYTES;
        for slave in &self.slaves {
            if base < slave.base + slave.size && slave.base < base + size {
                return Err(ConfigError::Overlap {
                    name: name.to_owned(),
                    base,
                    other: slave.name.to_string(),
                });
            }
        }
        self.slaves.push(Slave {
            name: name.into(),
            base,
            size,
            dev,
        });
        Ok(())
    }

    fn decode(&self, addr: u32) -> Option<(usize, u32)> {
        if addr % WORD_BYTES != 0 {
            return None;
        }
        self.slaves
            .iter()
            .position(|s| addr >= s.base && addr < s.base + s.size)
            .map(|idx| (idx, addr - self.slaves[idx].base))
    }

    fn fault(&self, err: BusError) -> BusError {
        self.errors.fetch_add(1, Ordering::Relaxed);
        warn!(%err, "bus transaction faulted");
        err
    }

    /// Remap a bank-relative error to the absolute bus address
    fn absolute(err: BusError, addr: u32) -> BusError {
        match err {
            BusError::UnmappedAddress(_) => BusError::UnmappedAddress(addr),
            BusError::ReadOnlyViolation(_) => BusError::ReadOnlyViolation(addr),
        }
    }

    /// Complete one word read transaction
    /// # Errors
    /// See [`BusError`]
    pub fn read(&mut self, addr: u32) -> Result<u32, BusError> {
        match self.decode(addr) {
            Some((idx, offset)) => {
                let completed = self.slaves[idx].dev.read(offset);
                completed.map_err(|e| self.fault(Self::absolute(e, addr)))
            }
            None => Err(self.fault(BusError::UnmappedAddress(addr))),
        }
    }

    /// Complete one word write transaction. Failed writes have no side effect.
    /// # Errors
    /// See [`BusError`]
    pub fn write(&mut self, addr: u32, value: u32) -> Result<(), BusError> {
        match self.decode(addr) {
            Some((idx, offset)) => {
                let completed = self.slaves[idx].dev.write(offset, value);
                completed.map_err(|e| self.fault(Self::absolute(e, addr)))
            }
            None => Err(self.fault(BusError::UnmappedAddress(addr))),
        }
    }

    /// Advance every peripheral by one discrete step
    pub fn tick(&mut self) {
        for slave in &mut self.slaves {
            slave.dev.tick();
        }
    }

    /// Return every peripheral to its design-time defaults and clear the error
    /// counter
    pub fn reset(&mut self) {
        for slave in &mut self.slaves {
            slave.dev.reset();
        }
        self.errors.store(0, Ordering::Relaxed);
    }

    /// Iterate the attached banks as `(name, base, registers)` for address map
    /// generation
    pub fn banks(&self) -> impl Iterator<Item = (&str, u32, Vec<RegDef>)> + '_ {
        self.slaves
            .iter()
            .map(|s| (s.name.as_str(), s.base, s.dev.regs()))
    }
}
