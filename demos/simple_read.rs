//! Example: Reading device values from a PLC
//!
//! Run with: cargo run --example simple_read
//!
//! This example demonstrates:
//! - Reading word and bit devices
//! - Reading a block of contiguous registers
//! - Using utility functions for bit analysis

use fx5_mc::utils::{format_binary, format_hex, get_bit};
use fx5_mc::{ConnectConfig, Connection};
use std::time::Duration;

fn main() -> fx5_mc::Result<()> {
    tracing_subscriber::fmt().init();

    // =========================================================================
    // Connect to PLC
    // =========================================================================

    let config = ConnectConfig::new("192.168.1.10").with_timeout(Duration::from_secs(2));
    let mut plc = Connection::open(config)?;
    println!("{plc}");

    // =========================================================================
    // Reading Single Devices
    // =========================================================================

    println!("=== Reading Devices ===\n");

    // Word devices return a signed 16-bit value
    let value = plc.read("D500")?;
    println!("D500 = {value}");

    // Bit devices return 0 or 1
    let relay = plc.read("M1600")?;
    println!("M1600 = {relay}");

    // Special registers work the same way; SD8490 holds part of the IP setup
    let sd = plc.read("SD8490")?;
    println!("SD8490 = {sd}");

    // =========================================================================
    // Reading Register Blocks
    // =========================================================================

    println!("\n=== Reading Blocks ===\n");

    let block = plc.read_words("D100", 5)?;
    println!("D100-D104: {block:?}");

    // =========================================================================
    // Bit Analysis
    // =========================================================================

    println!("\n=== Bit Analysis ===\n");

    let status = plc.read_words("D0", 1)?[0];
    println!("D0 = {} = {}", format_hex(status), format_binary(status));
    for bit in 0..16 {
        if get_bit(status, bit) {
            println!("  bit {bit} is ON");
        }
    }

    plc.close();
    Ok(())
}
