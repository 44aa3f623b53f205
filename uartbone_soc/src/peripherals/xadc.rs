//! The telemetry sampler: die temperature and supply voltages, re-sampled on a
//! fixed internal cadence independent of bus activity.
//!
//! A bus read returns the most recently completed sample, never a synchronous
//! conversion, so reads are non-blocking and two reads inside one sampling
//! period return identical values. Raw 12-bit codes only; scaling to physical
//! units is the host's side of the contract.

use crate::bus::{BusError, Peripheral, RegDef};
use csr_map::AccessMode;
use std::sync::{Arc, Mutex};

const TEMP: u32 = 0x0;
const VCCINT: u32 = 0x4;
const VCCAUX: u32 = 0x8;
const VCCBRAM: u32 = 0xC;

/// One conversion's worth of raw 12-bit channel codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorFrame {
    pub temp: u16,
    pub vccint: u16,
    pub vccaux: u16,
    pub vccbram: u16,
}

impl Default for SensorFrame {
    /// Codes for a die at roughly 40 °C with nominal 1.0/1.8/1.0 V supplies
    fn default() -> Self {
        Self {
            temp: 0x9F1,
            vccint: 0x555,
            vccaux: 0x99A,
            vccbram: 0x555,
        }
    }
}

/// Shared handle standing in for the analog front end. The environment updates
/// it at will; the sampler latches it once per sampling period.
#[derive(Debug, Clone, Default)]
pub struct SensorHandle(Arc<Mutex<SensorFrame>>);

impl SensorHandle {
    pub fn set(&self, frame: SensorFrame) {
        *self.0.lock().expect("sensor lock poisoned") = frame;
    }

    #[must_use]
    pub fn get(&self) -> SensorFrame {
        *self.0.lock().expect("sensor lock poisoned")
    }
}

#[derive(Debug)]
pub struct Xadc {
    source: SensorHandle,
    interval: u32,
    elapsed: u32,
    /// Last completed conversion, as visible on the bus
    latched: [u16; 4],
}

impl Xadc {
    /// Build the sampler along with the shared handle feeding it. The first
    /// conversion completes `interval` ticks after reset; until then the
    /// registers read zero.
    #[must_use]
    pub fn new(interval: u32) -> (Self, SensorHandle) {
        let source = SensorHandle::default();
        (
            Self {
                source: source.clone(),
                interval: interval.max(1),
                elapsed: 0,
                latched: [0; 4],
            },
            source,
        )
    }
}

impl Peripheral for Xadc {
    fn read(&self, offset: u32) -> Result<u32, BusError> {
        match offset {
            TEMP => Ok(u32::from(self.latched[0])),
            VCCINT => Ok(u32::from(self.latched[1])),
            VCCAUX => Ok(u32::from(self.latched[2])),
            VCCBRAM => Ok(u32::from(self.latched[3])),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn write(&mut self, offset: u32, _value: u32) -> Result<(), BusError> {
        match offset {
            TEMP | VCCINT | VCCAUX | VCCBRAM => Err(BusError::ReadOnlyViolation(offset)),
            _ => Err(BusError::UnmappedAddress(offset)),
        }
    }

    fn regs(&self) -> Vec<RegDef> {
        vec![
            RegDef {
                name: "temp",
                word_offset: 0,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
            RegDef {
                name: "vccint",
                word_offset: 1,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
            RegDef {
                name: "vccaux",
                word_offset: 2,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
            RegDef {
                name: "vccbram",
                word_offset: 3,
                words: 1,
                mode: AccessMode::ReadOnly,
            },
        ]
    }

    fn tick(&mut self) {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            let frame = self.source.get();
            self.latched = [frame.temp, frame.vccint, frame.vccaux, frame.vccbram];
        }
    }

    fn reset(&mut self) {
        self.elapsed = 0;
        self.latched = [0; 4];
    }
}
