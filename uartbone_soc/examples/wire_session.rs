//! Drive a SoC model directly with raw wire frames: blink the LEDs, read the
//! ident string back, and shift out the device DNA.

use uartbone_soc::wire::{read_frame, word_address, write_frame};
use uartbone_soc::{Soc, SocConfig};

fn read_word(soc: &mut Soc, name: &str) -> anyhow::Result<u32> {
    let addr = soc
        .csr_map()
        .register(name)
        .ok_or_else(|| anyhow::anyhow!("no such register: {name}"))?
        .addr;
    let response = soc.feed(&read_frame(word_address(addr), 1));
    anyhow::ensure!(response.len() == 4, "device stayed silent for {name}");
    Ok(u32::from_be_bytes(response.try_into().expect("4 bytes")))
}

fn write_word(soc: &mut Soc, name: &str, value: u32) -> anyhow::Result<()> {
    let addr = soc
        .csr_map()
        .register(name)
        .ok_or_else(|| anyhow::anyhow!("no such register: {name}"))?
        .addr;
    soc.feed(&write_frame(word_address(addr), &[value]));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut soc = Soc::new(&SocConfig::default())?;
    let leds = soc.led_lines();

    // Walk a pattern across the LED bank
    for i in 0..8 {
        write_word(&mut soc, "leds_out", 1 << i)?;
        println!("leds: {:010b}", leds.get());
    }

    // Shift out the device DNA
    write_word(&mut soc, "dna_load", 1)?;
    let mut dna = u64::from(read_word(&mut soc, "dna_data")?);
    for _ in 1..uartbone_soc::peripherals::dna::DNA_WIDTH {
        write_word(&mut soc, "dna_shift", 1)?;
        dna = (dna << 1) | u64::from(read_word(&mut soc, "dna_data")?);
    }
    println!("dna: {dna:#016x}");

    // Telemetry needs the sampling cadence to run
    soc.tick_many(2048);
    println!("xadc_temp code: {:#05x}", read_word(&mut soc, "xadc_temp")?);
    Ok(())
}
