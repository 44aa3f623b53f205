//! Loopback link wrapping an in-process SoC model, used in testing the
//! interface without hardware on the other end of a port.

use super::{Error, Link};
use std::collections::VecDeque;
use uartbone_soc::Soc;

/// A link whose far end is a [`Soc`] model. Sent bytes are fed straight to the
/// bridge; its response bytes queue up for [`Link::recv_exact`].
#[derive(Debug)]
pub struct Loopback {
    soc: Soc,
    rx: VecDeque<u8>,
}

impl Loopback {
    #[must_use]
    pub fn new(soc: Soc) -> Self {
        Self {
            soc,
            rx: VecDeque::new(),
        }
    }

    /// Access the device model, e.g. to drive input lines or advance the
    /// sampling cadence between transactions
    pub fn soc_mut(&mut self) -> &mut Soc {
        &mut self.soc
    }
}

impl Link for Loopback {
    fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.rx.extend(self.soc.feed(bytes));
        Ok(())
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        // A device that stays silent is indistinguishable from a timeout
        if self.rx.len() < buf.len() {
            return Err(Error::Timeout);
        }
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().expect("length checked above");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uartbone_soc::wire::{read_frame, word_address, write_frame};
    use uartbone_soc::SocConfig;

    #[test]
    fn test_round_trips_bridge_bytes() {
        let soc = Soc::new(&SocConfig::default()).unwrap();
        let scratch = soc.csr_map().register("ctrl_scratch").unwrap().addr;
        let mut link = Loopback::new(soc);
        link.send(&write_frame(word_address(scratch), &[0xAB_u32]))
            .unwrap();
        link.send(&read_frame(word_address(scratch), 1)).unwrap();
        let mut buf = [0u8; 4];
        link.recv_exact(&mut buf).unwrap();
        assert_eq!(u32::from_be_bytes(buf), 0xAB);
    }

    #[test]
    fn test_silence_is_timeout() {
        let soc = Soc::new(&SocConfig::default()).unwrap();
        let mut link = Loopback::new(soc);
        let mut buf = [0u8; 4];
        assert!(matches!(link.recv_exact(&mut buf), Err(Error::Timeout)));
    }
}
