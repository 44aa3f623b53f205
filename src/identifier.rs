//! Host-side readout of the identity string block.

use crate::client::{Error, RemoteClient};
use crate::link::Link;

/// Read the device's identity string from `identifier_mem`, one ASCII byte per
/// word, stopping at the NUL padding or the end of the block
/// # Errors
/// Returns client errors
pub fn read_ident<L>(client: &mut RemoteClient<L>) -> Result<String, Error>
where
    L: Link,
{
    let words = client
        .map()
        .register("identifier_mem")
        .map(|reg| reg.words)
        .ok_or_else(|| Error::UnknownRegister("identifier_mem".to_owned()))?;
    let mut ident = String::new();
    for word in 0..words {
        let code = client.read_register_word("identifier_mem", word)?;
        let byte = u8::try_from(code & 0xFF).expect("masked to one byte");
        if byte == 0 {
            break;
        }
        ident.push(char::from(byte));
    }
    Ok(ident)
}
