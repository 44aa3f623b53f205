//! # UARTbone SoC core
//!
//! The device side of the UARTbone serial register bridge: a CSR bus fabric,
//! the peripherals that live on it, and the bridge state machine that turns a
//! serial byte stream into bus transactions. There is no CPU in this system;
//! the bridge is the sole bus master and a host drives everything over the
//! link.
//!
//! The crate is a discrete-event model of the gateware, which makes it both
//! the reference for the wire protocol and a drop-in device for host-side
//! testing (see the `uartbone` crate's loopback link).

#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bridge;
pub mod bus;
pub mod peripherals;
pub mod soc;
pub mod wire;

pub use bridge::Bridge;
pub use bus::{BusError, BusFabric, ConfigError, Peripheral};
pub use soc::{Soc, SocConfig};
