//! The serial bridge: the sole bus master, converting the byte stream into bus
//! transactions.
//!
//! The state machine is self-clocking from content: each phase consumes
//! exactly the bytes it is owed, so no delimiter or timeout is needed to find
//! frame boundaries. An unrecognized command byte is discarded silently and
//! the machine stays in `Idle`; a sender that stalls mid-frame parks the
//! machine in its current phase until bytes arrive or the SoC is reset.
//!
//! Bus errors never produce wire traffic: a faulted write is dropped and a
//! faulted read ends response emission for the frame. The host infers
//! rejection by timeout.

use crate::bus::BusFabric;
use crate::wire::{Command, ADDR_BYTES};
use csr_map::WORD_BYTES;
use num_traits::FromPrimitive;
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Count {
        cmd: Command,
    },
    Address {
        cmd: Command,
        count: u8,
        got: usize,
        addr: u32,
    },
    Data {
        remaining: u8,
        addr: u32,
        got: usize,
        word: u32,
    },
}

#[derive(Debug)]
pub struct Bridge {
    state: State,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    #[must_use]
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// External reset: abandon any partially received frame
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// True when no frame is in progress
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Consume one byte from the serial stream, completing bus transactions as
    /// frames close and appending any read response bytes to `response`
    pub fn feed_byte(&mut self, byte: u8, fabric: &mut BusFabric, response: &mut Vec<u8>) {
        self.state = match self.state {
            State::Idle => match Command::from_u8(byte) {
                Some(cmd) => {
                    trace!(?cmd, "frame start");
                    State::Count { cmd }
                }
                None => {
                    debug!(byte, "discarding unrecognized command byte");
                    State::Idle
                }
            },
            State::Count { cmd } => State::Address {
                cmd,
                count: byte,
                got: 0,
                addr: 0,
            },
            State::Address {
                cmd,
                count,
                got,
                addr,
            } => {
                let addr = (addr << 8) | u32::from(byte);
                if got + 1 < ADDR_BYTES {
                    State::Address {
                        cmd,
                        count,
                        got: got + 1,
                        addr,
                    }
                } else {
                    // The wire carries word addresses
                    let byte_addr = addr.wrapping_mul(WORD_BYTES);
                    match (cmd, count) {
                        (_, 0) => State::Idle,
                        (Command::Read, _) => {
                            Self::emit(byte_addr, count, fabric, response);
                            State::Idle
                        }
                        (Command::Write, _) => State::Data {
                            remaining: count,
                            addr: byte_addr,
                            got: 0,
                            word: 0,
                        },
                    }
                }
            }
            State::Data {
                remaining,
                addr,
                got,
                word,
            } => {
                let word = (word << 8) | u32::from(byte);
                if got + 1 < WORD_BYTES as usize {
                    State::Data {
                        remaining,
                        addr,
                        got: got + 1,
                        word,
                    }
                } else {
                    // One bus transaction per received word; a fault is dropped
                    // (and counted) while the rest of the frame is still owed
                    let _ = fabric.write(addr, word);
                    if remaining == 1 {
                        State::Idle
                    } else {
                        State::Data {
                            remaining: remaining - 1,
                            addr: addr.wrapping_add(WORD_BYTES),
                            got: 0,
                            word: 0,
                        }
                    }
                }
            }
        };
    }

    /// Complete a read frame: one bus transaction per requested word, stopping
    /// emission at the first fault
    fn emit(byte_addr: u32, count: u8, fabric: &mut BusFabric, response: &mut Vec<u8>) {
        let mut addr = byte_addr;
        for _ in 0..count {
            match fabric.read(addr) {
                Ok(word) => response.extend_from_slice(&word.to_be_bytes()),
                Err(_) => break,
            }
            addr = addr.wrapping_add(WORD_BYTES);
        }
    }

    /// Consume a chunk of the serial stream and collect the response bytes
    pub fn feed(&mut self, bytes: &[u8], fabric: &mut BusFabric) -> Vec<u8> {
        let mut response = Vec::new();
        for &byte in bytes {
            self.feed_byte(byte, fabric, &mut response);
        }
        response
    }
}
