//! Host-side driver for the identity shift reader.
//!
//! The device never exposes the identity value as a plain register; it is
//! recovered MSB-first through the `dna_load`/`dna_shift`/`dna_data`
//! three-register protocol, one transaction per strobe or sample.

use crate::client::{Error, RemoteClient};
use crate::link::Link;
pub use uartbone_soc::peripherals::dna::DNA_WIDTH;

/// Run the full readout sequence: `load`, sample, then (width − 1) times
/// `shift` and sample, assembling the bits MSB-first.
///
/// The sequence is repeatable; running it twice on an unchanged device yields
/// the identical value.
/// # Errors
/// Returns client errors; a silent device surfaces as a link timeout on the
/// first sample
pub fn read_identity<L>(client: &mut RemoteClient<L>) -> Result<u64, Error>
where
    L: Link,
{
    client.write_register("dna_load", 1)?;
    let mut value = u64::from(client.read_register("dna_data")?);
    for _ in 1..DNA_WIDTH {
        client.write_register("dna_shift", 1)?;
        value = (value << 1) | u64::from(client.read_register("dna_data")?);
    }
    Ok(value)
}
