//! Defines the byte-stream links a remote client can run over.
//!
//! The wire protocol has no response for writes and no error status for
//! reads, so the only device-side signal a link can observe is silence;
//! every link therefore carries a receive deadline and surfaces
//! [`Error::Timeout`] when the device stays quiet.

pub mod loopback;
pub mod serial;

pub use loopback::Loopback;
pub use serial::{SerialLink, SerialParams};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Internal system IO error")]
    Io(#[from] std::io::Error),
    #[error("Error from the serial port layer")]
    Serial(#[from] serialport::Error),
    #[error("The device did not respond within the deadline")]
    Timeout,
}

/// A point-to-point byte stream to the device.
/// The methods of this trait *assume* that the link is already open.
pub trait Link {
    /// Send `bytes` down the link
    /// # Errors
    /// Returns an error when the link is unavailable
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Receive exactly `buf.len()` bytes, waiting no longer than the link's
    /// deadline
    /// # Errors
    /// [`Error::Timeout`] when the device stays silent
    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;
}
