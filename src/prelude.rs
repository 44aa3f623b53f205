//! Prelude (helpful reexports) for this package

pub use crate::client::RemoteClient;
pub use crate::link::{
    loopback::Loopback,
    serial::{SerialLink, SerialParams},
    Link,
};
pub use csr_map::csv::read_csv_file;
pub use uartbone_soc::{Soc, SocConfig};
