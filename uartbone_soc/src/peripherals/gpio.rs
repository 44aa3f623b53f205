//! GPIO register banks: a write-only output driver (LEDs) and read-only input
//! samplers (switches, buttons).
//!
//! The external pads are modeled as a shared [`Lines`] word so an environment
//! (a test, a demo, another thread) can observe outputs and drive inputs
//! between transactions.

use crate::bus::{BusError, Peripheral, RegDef};
use csr_map::AccessMode;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

const IO: u32 = 0x0;

/// A bank of IO lines, one bit per line. Cloning shares the underlying lines.
#[derive(Debug, Clone, Default)]
pub struct Lines(Arc<AtomicU32>);

impl Lines {
    #[must_use]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// GPIO-out: one write-only register driving `n` output lines. Bits above the
/// line count are ignored on write.
#[derive(Debug)]
pub struct Leds {
    lines: Lines,
    mask: u32,
}

impl Leds {
    /// Build the peripheral along with the shared handle to its output lines
    #[must_use]
    pub fn new(n: u32) -> (Self, Lines) {
        let lines = Lines::default();
        let mask = line_mask(n);
        (
            Self {
                lines: lines.clone(),
                mask,
            },
            lines,
        )
    }
}

impl Peripheral for Leds {
    fn read(&self, offset: u32) -> Result<u32, BusError> {
        match offset {
            IO => Err(BusError::ReadOnlyViolation(offset)),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), BusError> {
        match offset {
            IO => {
                self.lines.set(value & self.mask);
                Ok(())
            }
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn regs(&self) -> Vec<RegDef> {
        vec![RegDef {
            name: "out",
            word_offset: 0,
            words: 1,
            mode: AccessMode::WriteOnly,
        }]
    }

    fn reset(&mut self) {
        self.lines.set(0);
    }
}

/// GPIO-in: one read-only register returning the live sample of `n` input
/// lines at transaction time. No debouncing, no edge latching; two consecutive
/// reads may legitimately differ.
#[derive(Debug)]
pub struct GpioIn {
    reg_name: &'static str,
    lines: Lines,
    mask: u32,
}

impl GpioIn {
    /// Build the peripheral along with the shared handle driving its input
    /// lines
    #[must_use]
    pub fn new(reg_name: &'static str, n: u32) -> (Self, Lines) {
        let lines = Lines::default();
        let mask = line_mask(n);
        (
            Self {
                reg_name,
                lines: lines.clone(),
                mask,
            },
            lines,
        )
    }
}

impl Peripheral for GpioIn {
    fn read(&self, offset: u32) -> Result<u32, BusError> {
        match offset {
            IO => Ok(self.lines.get() & self.mask),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn write(&mut self, offset: u32, _value: u32) -> Result<(), BusError> {
        match offset {
            IO => Err(BusError::ReadOnlyViolation(offset)),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn regs(&self) -> Vec<RegDef> {
        vec![RegDef {
            name: self.reg_name,
            word_offset: 0,
            words: 1,
            mode: AccessMode::ReadOnly,
        }]
    }
}

fn line_mask(n: u32) -> u32 {
    if n >= 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leds_masked() {
        let (mut leds, lines) = Leds::new(6);
        leds.write(IO, 0xFFFF_FF2A).unwrap();
        // 6 lines driven, high bits ignored
        assert_eq!(lines.get(), 0x2A);
    }

    #[test]
    fn test_leds_write_only() {
        let (leds, _) = Leds::new(6);
        assert_eq!(leds.read(IO), Err(BusError::ReadOnlyViolation(IO)));
    }

    #[test]
    fn test_leds_reset() {
        let (mut leds, lines) = Leds::new(2);
        leds.write(IO, 0x3).unwrap();
        leds.reset();
        assert_eq!(lines.get(), 0);
    }

    #[test]
    fn test_input_live_sample() {
        let (switches, lines) = GpioIn::new("in", 4);
        lines.set(0b1010);
        assert_eq!(switches.read(IO), Ok(0b1010));
        lines.set(0b0101);
        assert_eq!(switches.read(IO), Ok(0b0101));
    }

    #[test]
    fn test_input_read_only() {
        let (mut buttons, _) = GpioIn::new("in", 2);
        assert_eq!(buttons.write(IO, 1), Err(BusError::ReadOnlyViolation(IO)));
    }

    #[test]
    fn test_input_masked() {
        let (buttons, lines) = GpioIn::new("in", 2);
        lines.set(0xFF);
        assert_eq!(buttons.read(IO), Ok(0b11));
    }
}
