//! Example: Writing device values to a PLC
//!
//! Run with: cargo run --example simple_write
//!
//! This example demonstrates:
//! - Writing word and bit devices
//! - Writing a block of contiguous registers
//! - Packing short ASCII text into registers

use fx5_mc::{ConnectConfig, Connection};

fn main() -> fx5_mc::Result<()> {
    tracing_subscriber::fmt().init();

    let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;

    // =========================================================================
    // Writing Single Devices
    // =========================================================================

    // Word devices accept any 16-bit pattern, signed or unsigned
    plc.write("D500", 30)?;
    plc.write("D501", -100)?;

    // Bit devices accept 0 or 1
    plc.write("M1600", 1)?;

    // Read back to verify
    println!("D500 = {}", plc.read("D500")?);
    println!("D501 = {}", plc.read("D501")?);
    println!("M1600 = {}", plc.read("M1600")?);

    // =========================================================================
    // Writing Register Blocks
    // =========================================================================

    // One frame writes up to 720 contiguous registers
    plc.write_words("D100", &[10, 20, 30, 40, 50])?;
    println!("D100-D104: {:?}", plc.read_words("D100", 5)?);

    // =========================================================================
    // ASCII Text
    // =========================================================================

    // Two characters per register, low byte first
    plc.write_ascii("D200", "OK")?;
    println!("D200 = '{}'", plc.read_ascii("D200")?);

    plc.close();
    Ok(())
}
