//! Example: Applying a batch command string
//!
//! Run with: cargo run --example batch_write
//!
//! This example demonstrates:
//! - Executing a comma-separated DEVICE=VALUE command
//! - Handling partial application when a write fails mid-batch

use fx5_mc::{ConnectConfig, Connection, McError};

fn main() -> fx5_mc::Result<()> {
    tracing_subscriber::fmt().init();

    let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;

    // =========================================================================
    // Batch Writes
    // =========================================================================

    // The whole string is parsed before the first write; the writes then
    // run left to right over this connection.
    let applied = plc.exec_cmd("D150=31,D200=5,D300=2,D160=1,D210=1,D310=1,M1501=1")?;
    println!("applied {applied} writes");

    // =========================================================================
    // Partial Failure
    // =========================================================================

    // A batch is not transactional: on a mid-batch failure the earlier
    // writes stay applied, and the error says how many. Most special
    // registers are read-only, so the SD0 write below is refused by the CPU.
    match plc.exec_cmd("D400=1,SD0=2,D500=3") {
        Ok(n) => println!("applied {n} writes"),
        Err(McError::BatchFailed {
            applied,
            device,
            source,
        }) => {
            println!("stopped at {device} after {applied} writes: {source}");
        }
        Err(e) => return Err(e),
    }

    plc.close();
    Ok(())
}
