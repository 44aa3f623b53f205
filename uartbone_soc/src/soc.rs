//! The composition root: builds the bus out of peripherals, owns the bridge,
//! and exports the composition-time address map artifact.

use crate::{
    bridge::Bridge,
    bus::{BusFabric, ConfigError},
    peripherals::{
        ctrl::Ctrl,
        dna::{Dna, DNA_MASK},
        gpio::{GpioIn, Leds, Lines},
        identifier::Identifier,
        xadc::{SensorHandle, Xadc},
    },
};
use csr_map::{CsrMap, CsrRegister, WORD_BYTES};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::debug;

/// Base of the CSR region
pub const CSR_BASE: u32 = 0xE000_0000;

/// Each peripheral bank is allocated on this stride
const BANK_STRIDE: u32 = 0x800;

const fn bank(n: u32) -> u32 {
    CSR_BASE + n * BANK_STRIDE
}

/// Design-time parameters of one SoC instance
#[derive(Debug, Clone)]
pub struct SocConfig {
    /// Human readable identity string, readable at `identifier_mem`
    pub ident: String,
    pub n_leds: u32,
    pub n_switches: u32,
    pub n_buttons: u32,
    /// Device-unique 57-bit identity value
    pub dna: u64,
    /// Telemetry sampling period in ticks
    pub sample_interval: u32,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            ident: "UARTbone System On Chip".to_owned(),
            n_leds: 10,
            n_switches: 4,
            n_buttons: 2,
            dna: 0x00AB_CDEF_0123_4567 & DNA_MASK,
            sample_interval: 1024,
        }
    }
}

/// The device: a bus fabric full of peripherals fronted by the serial bridge.
///
/// This is a discrete-event model of the gateware: [`Soc::feed`] advances the
/// bridge byte by byte and [`Soc::tick`] advances the autonomous sampling
/// cadence. The two are deliberately decoupled, as they are in the device.
#[derive(Debug)]
pub struct Soc {
    fabric: BusFabric,
    bridge: Bridge,
    reset_request: Arc<AtomicBool>,
    leds: Lines,
    switches: Lines,
    buttons: Lines,
    sensors: SensorHandle,
    ident: String,
    sample_interval: u32,
}

impl Soc {
    /// Compose a SoC from its design-time configuration
    /// # Errors
    /// Returns a [`ConfigError`] for layouts that could not exist: overlapping
    /// banks, too many IO lines for one word, an oversized ident string
    pub fn new(config: &SocConfig) -> Result<Self, ConfigError> {
        for (name, lines) in [
            ("leds", config.n_leds),
            ("switches", config.n_switches),
            ("buttons", config.n_buttons),
        ] {
            if lines > 32 {
                return Err(ConfigError::TooManyLines {
                    name: name.to_owned(),
                    lines,
                });
            }
        }

        let mut fabric = BusFabric::new();
        let reset_request = Arc::new(AtomicBool::new(false));

        let ctrl = Ctrl::new(fabric.error_counter(), reset_request.clone());
        let identifier = Identifier::new(&config.ident)?;
        let dna = Dna::new(config.dna);
        let (xadc, sensors) = Xadc::new(config.sample_interval);
        let (leds_dev, leds) = Leds::new(config.n_leds);
        let (switches_dev, switches) = GpioIn::new("in", config.n_switches);
        let (buttons_dev, buttons) = GpioIn::new("in", config.n_buttons);

        fabric.attach("ctrl", bank(0), Box::new(ctrl))?;
        fabric.attach("identifier", bank(1), Box::new(identifier))?;
        fabric.attach("dna", bank(2), Box::new(dna))?;
        fabric.attach("xadc", bank(3), Box::new(xadc))?;
        fabric.attach("leds", bank(4), Box::new(leds_dev))?;
        fabric.attach("switches", bank(5), Box::new(switches_dev))?;
        fabric.attach("buttons", bank(6), Box::new(buttons_dev))?;

        Ok(Self {
            fabric,
            bridge: Bridge::new(),
            reset_request,
            leds,
            switches,
            buttons,
            sensors,
            ident: config.ident.clone(),
            sample_interval: config.sample_interval,
        })
    }

    /// Feed received serial bytes to the bridge, returning the bytes to send
    /// back over the link
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<u8> {
        let mut response = Vec::new();
        for &byte in bytes {
            self.bridge.feed_byte(byte, &mut self.fabric, &mut response);
            // A completed ctrl_reset write takes effect before the next byte
            if self.reset_request.swap(false, Ordering::Relaxed) {
                self.reset();
            }
        }
        response
    }

    /// Advance the autonomous peripheral cadence by one tick
    pub fn tick(&mut self) {
        self.fabric.tick();
    }

    /// Advance the autonomous peripheral cadence by `n` ticks
    pub fn tick_many(&mut self, n: u32) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// External reset: registers back to design-time defaults, bridge to idle
    pub fn reset(&mut self) {
        debug!("soc reset");
        self.fabric.reset();
        self.bridge.reset();
    }

    /// The output line handle of the LED bank
    #[must_use]
    pub fn led_lines(&self) -> Lines {
        self.leds.clone()
    }

    /// The input line handle of the switch bank
    #[must_use]
    pub fn switch_lines(&self) -> Lines {
        self.switches.clone()
    }

    /// The input line handle of the button bank
    #[must_use]
    pub fn button_lines(&self) -> Lines {
        self.buttons.clone()
    }

    /// The handle feeding the telemetry sampler
    #[must_use]
    pub fn sensors(&self) -> SensorHandle {
        self.sensors.clone()
    }

    /// Produce the composition-time address map: the contract a remote client
    /// consumes
    #[must_use]
    pub fn csr_map(&self) -> CsrMap {
        let mut csr_map = CsrMap::default();
        for (name, base, regs) in self.fabric.banks() {
            csr_map.banks.insert(name.into(), base);
            for reg in regs {
                csr_map.registers.insert(
                    format!("{name}_{}", reg.name).into(),
                    CsrRegister {
                        addr: base + reg.word_offset * WORD_BYTES,
                        words: reg.words,
                        mode: reg.mode,
                    },
                );
            }
        }
        csr_map
            .constants
            .insert("ident".into(), self.ident.clone());
        csr_map
            .constants
            .insert("config_csr_data_width".into(), "32".to_owned());
        csr_map.constants.insert(
            "config_sample_interval".into(),
            self.sample_interval.to_string(),
        );
        csr_map
    }

    /// Write the address map artifact to disk in the csr.csv format
    /// # Errors
    /// Returns errors on file IO
    pub fn write_csr_csv<T>(&self, filename: T) -> Result<(), csr_map::csv::Error>
    where
        T: AsRef<std::path::Path>,
    {
        csr_map::csv::write_csv_file(filename, &self.csr_map())
    }
}
