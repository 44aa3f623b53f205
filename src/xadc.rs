//! Host-side view of the telemetry sampler: raw 12-bit codes come off the
//! bus, scaling to physical units happens here. The conversion constants are
//! the boundary contract with the device's analog front end.

use crate::client::{Error, RemoteClient};
use crate::link::Link;

/// Convert a raw temperature code to degrees Celsius
#[must_use]
pub fn temperature_celsius(code: u32) -> f64 {
    f64::from(code) * 503.975 / 4096.0 - 273.15
}

/// Convert a raw supply-rail code to volts
#[must_use]
pub fn supply_volts(code: u32) -> f64 {
    f64::from(code) / 4096.0 * 3.0
}

/// Read the die temperature in degrees Celsius
/// # Errors
/// Returns client errors
pub fn read_temperature<L>(client: &mut RemoteClient<L>) -> Result<f64, Error>
where
    L: Link,
{
    Ok(temperature_celsius(client.read_register("xadc_temp")?))
}

/// Read a supply rail (`xadc_vccint`, `xadc_vccaux`, `xadc_vccbram`) in volts
/// # Errors
/// Returns client errors
pub fn read_supply<L>(client: &mut RemoteClient<L>, rail: &str) -> Result<f64, Error>
where
    L: Link,
{
    Ok(supply_volts(client.read_register(rail)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_conversion_fixpoints() {
        // Code 0 is absolute zero, full scale is 3 V
        assert_eq!(temperature_celsius(0), -273.15);
        assert_eq!(supply_volts(4096), 3.0);
    }

    #[test]
    fn test_nominal_codes() {
        // The codes a healthy die reports convert to sane values
        let temp = temperature_celsius(0x9F1);
        assert!((39.0..41.0).contains(&temp));
        let vccint = supply_volts(0x555);
        assert!((0.99..1.01).contains(&vccint));
    }
}
