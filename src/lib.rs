//! # UARTbone
//!
//! A library for monitor and control of CPU-less FPGA designs over a serial
//! register bridge. The host side lives here: a [`client::RemoteClient`] that
//! turns register names from a composition-time address map into one-frame
//! wire transactions, links to carry the frames (a real serial port or an
//! in-process device model), and drivers for the stock peripherals (identity
//! shift readout, telemetry unit conversion, ident string).
//!
//! The device side - bus fabric, peripherals, and the bridge state machine -
//! lives in the `uartbone_soc` crate; the address map file format lives in
//! `csr_map`.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod dna;
pub mod identifier;
pub mod link;
pub mod prelude;
pub mod xadc;
