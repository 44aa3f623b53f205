//! The real link: a serial port at a fixed configured baud rate.

use super::{Error, Link};
use serialport::SerialPort;
use std::{
    io::{Read, Write},
    time::Duration,
};

const DEFAULT_TIMEOUT: f32 = 0.5;

/// Connection parameters for one device instance. The baud rate is fixed per
/// device, not negotiated.
#[derive(Debug, Clone)]
pub struct SerialParams {
    /// Port path, e.g. `/dev/ttyUSB0`
    pub path: String,
    pub baud: u32,
    /// Receive deadline; silence past this is reported as a timeout
    pub timeout: Duration,
}

impl SerialParams {
    #[must_use]
    pub fn new(path: &str, baud: u32) -> Self {
        Self {
            path: path.to_owned(),
            baud,
            timeout: Duration::from_secs_f32(DEFAULT_TIMEOUT),
        }
    }
}

/// A serial connection (newtype for a boxed [`SerialPort`])
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the port at the configured fixed baud rate, 8N1
    /// # Errors
    /// Will return an error if the port fails to open
    pub fn open(params: &SerialParams) -> Result<Self, Error> {
        let port = serialport::new(&params.path, params.baud)
            .timeout(params.timeout)
            .open()?;
        Ok(Self { port })
    }
}

impl Link for SerialLink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.port.read_exact(buf).map_err(|e| match e.kind() {
            // Compat for both windows and *nix
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Io(e),
        })
    }
}
