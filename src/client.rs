//! The remote register client: name-addressed reads and writes over a link.
//!
//! The client owns the composition-time address map and translates every
//! operation into exactly one wire frame. Reads block until the response
//! words arrive or the link deadline passes; writes are fire-and-forget
//! because the protocol defines no acknowledgment.

use crate::link::{self, Link, SerialLink, SerialParams};
use csr_map::{CsrMap, CsrRegister};
use thiserror::Error;
use tracing::debug;
use uartbone_soc::wire::{read_frame, word_address, write_frame};

#[derive(Error, Debug)]
pub enum Error {
    #[error("No register named `{0}` in the address map")]
    UnknownRegister(String),
    #[error("Register `{0}` is not readable")]
    NotReadable(String),
    #[error("Register `{0}` is not writable")]
    NotWritable(String),
    #[error("Word {word} is outside register `{name}`")]
    OutOfRange { name: String, word: u32 },
    #[error(transparent)]
    Link(#[from] link::Error),
}

/// A connected client for one device instance
pub struct RemoteClient<L> {
    link: L,
    map: CsrMap,
}

impl RemoteClient<SerialLink> {
    /// Open the serial link and build a client around it. The link handle is
    /// released when the client is dropped or [`RemoteClient::close`]d,
    /// whichever comes first, on every exit path.
    /// # Errors
    /// Returns an error if the port fails to open
    pub fn open(params: &SerialParams, map: CsrMap) -> Result<Self, Error> {
        let link = SerialLink::open(params)?;
        Ok(Self::from_link(link, map))
    }
}

impl<L> RemoteClient<L>
where
    L: Link,
{
    /// Build a client over an already opened link
    pub fn from_link(link: L, map: CsrMap) -> Self {
        Self { link, map }
    }

    /// The address map this client was built from
    pub fn map(&self) -> &CsrMap {
        &self.map
    }

    /// Close the connection, releasing the link handle
    pub fn close(self) {
        drop(self);
    }

    fn lookup(&self, name: &str) -> Result<CsrRegister, Error> {
        self.map
            .register(name)
            .copied()
            .ok_or_else(|| Error::UnknownRegister(name.to_owned()))
    }

    /// Read one word from the named register
    /// # Example
    /// ```
    /// # use uartbone::prelude::*;
    /// # let soc = Soc::new(&SocConfig::default()).unwrap();
    /// # let map = soc.csr_map();
    /// # let mut fpga = RemoteClient::from_link(Loopback::new(soc), map);
    /// let scratch = fpga.read_register("ctrl_scratch").unwrap();
    /// assert_eq!(scratch, 0x1234_5678);
    /// ```
    /// # Errors
    /// Fails locally, before any frame is sent, for unknown names and
    /// write-only registers; fails with a link timeout when the device stays
    /// silent (the only way a device-side rejection is observable)
    pub fn read_register(&mut self, name: &str) -> Result<u32, Error> {
        self.read_register_word(name, 0)
    }

    /// Read word `word` of the named (possibly multi-word) register
    /// # Errors
    /// As [`RemoteClient::read_register`], plus out-of-range word indices
    pub fn read_register_word(&mut self, name: &str, word: u32) -> Result<u32, Error> {
        let reg = self.lookup(name)?;
        if !reg.mode.readable() {
            return Err(Error::NotReadable(name.to_owned()));
        }
        if word >= reg.words {
            return Err(Error::OutOfRange {
                name: name.to_owned(),
                word,
            });
        }
        let addr = reg.addr + word * csr_map::WORD_BYTES;
        debug!(name, addr, "read");
        self.link.send(&read_frame(word_address(addr), 1))?;
        let mut buf = [0u8; csr_map::WORD_BYTES as usize];
        self.link.recv_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Write one word to the named register. Fire-and-forget: the protocol
    /// defines no acknowledgment, so success means the frame left the link.
    /// # Errors
    /// Fails locally, before any frame is sent, for unknown names and
    /// registers that are not writable
    pub fn write_register(&mut self, name: &str, value: u32) -> Result<(), Error> {
        let reg = self.lookup(name)?;
        if !reg.mode.writable() {
            return Err(Error::NotWritable(name.to_owned()));
        }
        debug!(name, addr = reg.addr, value, "write");
        self.link.send(&write_frame(word_address(reg.addr), &[value]))?;
        Ok(())
    }
}
