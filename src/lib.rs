//! # MC Protocol Client for Mitsubishi FX5
//!
//! A Rust library for reading and writing device memory on Mitsubishi FX5
//! (MELSEC iQ-F) PLCs using the MC protocol, 3E frame, binary code, over
//! TCP.
//!
//! This is a **protocol-only** library—no polling, schedulers, or
//! application-level features. Each call produces exactly 1 request and
//! 1 response over a persistent connection. No automatic retries, caching,
//! or reconnection.
//!
//! ## Features
//!
//! - **Protocol-only** — device batch read/write, nothing else
//! - **Deterministic** — each call produces exactly 1 request and 1 response
//! - **Type-safe** — device kinds as enums, addresses parsed and validated
//!   before anything touches the wire
//! - **No panics** — all errors returned as `Result<T, McError>`
//! - **Explicit lifecycle** — a [`Connection`] value owns its socket; open
//!   and close are explicit, close is idempotent
//!
//! ## Quick Start
//!
//! ```no_run
//! use fx5_mc::{ConnectConfig, Connection};
//!
//! fn main() -> fx5_mc::Result<()> {
//!     let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;
//!
//!     plc.write("D500", 30)?;
//!     println!("{}", plc.read("D500")?); // -> 30
//!     plc.write("M1600", 1)?;
//!     println!("{}", plc.read("M1600")?); // -> 1
//!
//!     // Several writes from one command string, applied left to right
//!     plc.exec_cmd("D150=31,D200=5,D300=2")?;
//!
//!     plc.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Device Addressing
//!
//! Devices are referenced by text: a kind prefix and a number, e.g.
//! `D500` (data register 500) or `M1600` (internal relay 1600). Word
//! devices carry 16-bit registers; bit devices carry single bits read and
//! written as 0/1. X and Y are numbered in octal and W in hexadecimal,
//! following the GX Works device notation. See [`DeviceKind`] for the full
//! table.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, McError>`]. The library never panics
//! in public code.
//!
//! ```no_run
//! use fx5_mc::{ConnectConfig, Connection, McError};
//!
//! let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;
//!
//! match plc.read("D100") {
//!     Ok(value) => println!("D100 = {value}"),
//!     Err(McError::Timeout) => {
//!         // the connection is now unusable; open a fresh one
//!     }
//!     Err(McError::Plc { code }) => {
//!         println!("PLC refused: 0x{code:04X}");
//!     }
//!     Err(e) => println!("error: {e}"),
//! }
//! # Ok::<(), McError>(())
//! ```
//!
//! ## Configuration
//!
//! ```
//! use fx5_mc::ConnectConfig;
//! use std::time::Duration;
//!
//! let config = ConnectConfig::new("192.168.1.10")
//!     .with_port(2556)                        // default: 2555
//!     .with_timeout(Duration::from_secs(5))   // default: 2s
//!     .with_monitoring_timer(0x000A);         // default: 0
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Each operation does exactly what it says
//! 2. No magic or implicit behavior
//! 3. The application has full control over retry and reconnection
//! 4. Errors are always explicit and descriptive

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod batch;
mod client;
mod command;
mod device;
mod error;
mod frame;
mod response;
mod transport;
pub mod utils;

// Public re-exports
pub use batch::{BatchCommand, BatchEntry};
pub use client::{ConnectConfig, Connection};
pub use command::{
    ReadCommand, WriteBitCommand, WriteWordCommand, MAX_READ_POINTS, MAX_WRITE_POINTS,
};
pub use device::{AccessUnit, DeviceAddress, DeviceKind};
pub use error::{end_code_description, McError, Result};
pub use frame::{FrameHeader, RESPONSE_HEADER_SIZE};
pub use response::{McResponse, MIN_RESPONSE_SIZE};
pub use transport::{TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT, MAX_FRAME_SIZE};
