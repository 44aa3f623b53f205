//! The serial wire protocol shared by the bridge and the remote client.
//!
//! One frame per transaction, no interleaving, no delimiters; frame length is
//! fully determined by the command byte and the fixed field widths:
//!
//! ```text
//! host -> device   [cmd:1][count:1][word address:4 BE]([data:4 BE] x count, writes only)
//! device -> host   [data:4 BE] x count                (reads only)
//! ```
//!
//! Addresses on the wire are word addresses (bus byte address divided by
//! four). There is no acknowledgment for writes and no status byte for reads;
//! a device-side rejection is visible to the host only as silence.

use csr_map::WORD_BYTES;
use num_derive::{FromPrimitive, ToPrimitive};

/// Width of the wire address field in bytes
pub const ADDR_BYTES: usize = 4;

/// The command byte opening every frame
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum Command {
    Write = 0x01,
    Read = 0x02,
}

/// Convert a bus byte address to the word address carried on the wire
#[must_use]
pub fn word_address(byte_addr: u32) -> u32 {
    byte_addr / WORD_BYTES
}

/// Build a write frame carrying `words` at consecutive word addresses starting
/// from `word_addr`
#[must_use]
pub fn write_frame(word_addr: u32, words: &[u32]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(2 + ADDR_BYTES + words.len() * WORD_BYTES as usize);
    frame.push(Command::Write as u8);
    frame.push(words.len().try_into().expect("count exceeds one byte"));
    frame.extend_from_slice(&word_addr.to_be_bytes());
    for word in words {
        frame.extend_from_slice(&word.to_be_bytes());
    }
    frame
}

/// Build a read frame requesting `count` words starting from `word_addr`
#[must_use]
pub fn read_frame(word_addr: u32, count: u8) -> Vec<u8> {
    let mut frame = Vec::with_capacity(2 + ADDR_BYTES);
    frame.push(Command::Read as u8);
    frame.push(count);
    frame.extend_from_slice(&word_addr.to_be_bytes());
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_frame() {
        let frame = write_frame(0x3800_0401, &[0x0000_002A]);
        assert_eq!(
            frame,
            vec![0x01, 0x01, 0x38, 0x00, 0x04, 0x01, 0x00, 0x00, 0x00, 0x2A]
        );
    }

    #[test]
    fn test_read_frame() {
        let frame = read_frame(0x3800_0401, 2);
        assert_eq!(frame, vec![0x02, 0x02, 0x38, 0x00, 0x04, 0x01]);
    }

    #[test]
    fn test_word_address() {
        assert_eq!(word_address(0xE000_2000), 0x3800_0800);
    }
}
