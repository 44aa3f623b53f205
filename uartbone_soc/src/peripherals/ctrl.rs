//! The SoC control block: soft reset, bus-sanity scratch register, and the
//! bus-error counter.

use crate::bus::{BusError, Peripheral, RegDef};
use csr_map::AccessMode;
use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};
use tracing::debug;

const RESET: u32 = 0x0;
const SCRATCH: u32 = 0x4;
const BUS_ERRORS: u32 = 0x8;

/// Reset value of the scratch register, chosen so a host can verify bus access
/// and endianness in one read
pub const SCRATCH_DEFAULT: u32 = 0x1234_5678;

#[derive(Debug)]
pub struct Ctrl {
    scratch: u32,
    bus_errors: Arc<AtomicU32>,
    reset_request: Arc<AtomicBool>,
}

impl Ctrl {
    #[must_use]
    pub fn new(bus_errors: Arc<AtomicU32>, reset_request: Arc<AtomicBool>) -> Self {
        Self {
            scratch: SCRATCH_DEFAULT,
            bus_errors,
            reset_request,
        }
    }
}

impl Peripheral for Ctrl {
    fn read(&self, offset: u32) -> Result<u32, BusError> {
        match offset {
            RESET => Err(BusError::ReadOnlyViolation(offset)),
            SCRATCH => Ok(self.scratch),
            BUS_ERRORS => Ok(self.bus_errors.load(Ordering::Relaxed)),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), BusError> {
        match offset {
            RESET => {
                if value & 1 == 1 {
                    debug!("soft reset requested");
                    self.reset_request.store(true, Ordering::Relaxed);
                }
                Ok(())
            }
            SCRATCH => {
                self.scratch = value;
                Ok(())
            }
            BUS_ERRORS => Err(BusError::ReadOnlyViolation(offset)),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn regs(&self) -> Vec<RegDef> {
        vec![
            RegDef {
                name: "reset",
                word_offset: 0,
                words: 1,
                mode: AccessMode::WriteOnly,
            },
            RegDef {
                name: "scratch",
                word_offset: 1,
                words: 1,
                mode: AccessMode::ReadWrite,
            },
            RegDef {
                name: "bus_errors",
                word_offset: 2,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
        ]
    }

    fn reset(&mut self) {
        self.scratch = SCRATCH_DEFAULT;
    }
}
