//! Connection and the device read/write surface.
//!
//! This module provides [`Connection`], the primary interface for talking
//! to an FX5 over its SLMP socket. A connection owns exactly one TCP
//! stream and serializes request/response pairs over it; every operation
//! runs the same pipeline: parse the device text, encode a request frame,
//! exchange it, decode the response.
//!
//! # Example
//!
//! ```no_run
//! use fx5_mc::{ConnectConfig, Connection};
//!
//! fn main() -> fx5_mc::Result<()> {
//!     let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;
//!
//!     plc.write("D500", 30)?;
//!     println!("D500 = {}", plc.read("D500")?); // -> 30
//!     plc.write("M1600", 1)?;
//!     println!("M1600 = {}", plc.read("M1600")?); // -> 1
//!
//!     plc.close();
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle
//!
//! A connection is `Open` from [`Connection::open`] until [`close`]
//! (idempotent) and cannot be reopened; open a fresh one instead. A
//! [`Timeout`](crate::McError::Timeout) mid-exchange leaves response bytes
//! in flight with no way to resynchronize, so the connection marks itself
//! unusable and every later exchange fails with
//! [`NotConnected`](crate::McError::NotConnected) until the caller opens a
//! fresh connection.
//!
//! # Thread Safety
//!
//! Operations take `&mut self`; sharing a connection between threads
//! requires an external mutex or a single owning task. Independent
//! connections (one per PLC) are fully isolated from each other.
//!
//! [`close`]: Connection::close

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::batch::BatchCommand;
use crate::command::{ReadCommand, WriteBitCommand, WriteWordCommand};
use crate::device::{AccessUnit, DeviceAddress};
use crate::error::{end_code_description, McError, Result};
use crate::frame::FrameHeader;
use crate::response::McResponse;
use crate::transport::{TcpTransport, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::utils::{ascii_to_word, word_to_ascii};

/// Configuration for opening a connection.
///
/// # Example
///
/// ```
/// use fx5_mc::ConnectConfig;
/// use std::time::Duration;
///
/// let config = ConnectConfig::new("192.168.1.10")
///     .with_port(2556)
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// PLC hostname or IP address.
    pub host: String,
    /// TCP port of the PLC's SLMP connection (default 2555).
    pub port: u16,
    /// Connect/read/write timeout (default 2 seconds).
    pub timeout: Duration,
    /// Access route and monitoring timer for every frame.
    pub header: FrameHeader,
}

impl ConnectConfig {
    /// Creates a configuration with default port, timeout and access route.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            header: FrameHeader::default(),
        }
    }

    /// Sets a custom TCP port (default 2555).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets a custom timeout (default 2 seconds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the network number for routed access (default 0x00, own station).
    pub fn with_network(mut self, network: u8) -> Self {
        self.header.network = network;
        self
    }

    /// Sets the PC number (default 0xFF, own station).
    pub fn with_pc(mut self, pc: u8) -> Self {
        self.header.pc = pc;
        self
    }

    /// Sets the destination module I/O number (default 0x03FF, CPU module).
    pub fn with_io(mut self, io: u16) -> Self {
        self.header.io = io;
        self
    }

    /// Sets the destination module station number (default 0x00).
    pub fn with_station(mut self, station: u8) -> Self {
        self.header.station = station;
        self
    }

    /// Sets the CPU monitoring timer in 250 ms units (default 0, wait
    /// indefinitely on the CPU side; the socket timeout still applies).
    pub fn with_monitoring_timer(mut self, timer: u16) -> Self {
        self.header.timer = timer;
        self
    }
}

/// A connection to one PLC.
///
/// Owns the socket exclusively and keeps exactly one request in flight.
/// Nothing is retried internally; every failure surfaces to the caller,
/// and retry policy stays with the application.
pub struct Connection {
    config: ConnectConfig,
    transport: Option<TcpTransport>,
    /// Set when a timeout left response bytes in flight.
    poisoned: bool,
}

impl Connection {
    /// Opens a TCP connection to the PLC.
    ///
    /// # Errors
    ///
    /// Returns `McError::Connect` on refusal, unreachable host, or
    /// connect timeout.
    pub fn open(config: ConnectConfig) -> Result<Self> {
        let transport = TcpTransport::connect(&config.host, config.port, config.timeout)?;
        Ok(Self {
            config,
            transport: Some(transport),
            poisoned: false,
        })
    }

    /// Reads a single device value.
    ///
    /// Word devices return the register interpreted as a signed 16-bit
    /// value; bit devices return 0 or 1.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidAddress`, `NotConnected`, `Timeout`,
    /// `MalformedFrame`, `Plc` and I/O failures.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fx5_mc::{ConnectConfig, Connection};
    /// # let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;
    /// let level = plc.read("D500")?;
    /// let running = plc.read("M1600")? == 1;
    /// # Ok::<(), fx5_mc::McError>(())
    /// ```
    pub fn read(&mut self, device: &str) -> Result<i32> {
        let address: DeviceAddress = device.parse()?;
        let cmd = ReadCommand::new(self.config.header, address, 1)?;
        let response = self.exchange(&cmd.to_bytes())?;
        response.check_end_code()?;
        match address.kind.unit() {
            AccessUnit::Bit => Ok(response.to_bit()? as i32),
            AccessUnit::Word => Ok(response.to_word()? as i32),
        }
    }

    /// Writes a single device value.
    ///
    /// The value is range-checked against the device kind before anything
    /// is sent: bit devices take 0 or 1, word devices any 16-bit pattern
    /// (`-32768..=65535`).
    ///
    /// # Errors
    ///
    /// `McError::InvalidValue` for out-of-range values, plus everything
    /// [`read`](Connection::read) can fail with.
    pub fn write(&mut self, device: &str, value: i32) -> Result<()> {
        let address: DeviceAddress = device.parse()?;
        self.write_value(address, value)
    }

    /// Executes a `DEVICE=VALUE,DEVICE=VALUE,...` batch command.
    ///
    /// The whole string is parsed and range-checked before the first
    /// write, then the writes run sequentially left to right over this
    /// connection. Returns the number of writes applied.
    ///
    /// Execution is **not transactional**: if a write fails, the earlier
    /// writes stay applied and the error reports how many, together with
    /// the device that failed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use fx5_mc::{ConnectConfig, Connection};
    /// # let mut plc = Connection::open(ConnectConfig::new("192.168.1.10"))?;
    /// let applied = plc.exec_cmd("D150=31,D200=5,D300=2,M1501=1")?;
    /// assert_eq!(applied, 4);
    /// # Ok::<(), fx5_mc::McError>(())
    /// ```
    pub fn exec_cmd(&mut self, command: &str) -> Result<usize> {
        let batch: BatchCommand = command.parse()?;
        let mut applied = 0;
        for entry in batch.entries() {
            if let Err(source) = self.write_value(entry.address, entry.value) {
                return Err(McError::BatchFailed {
                    applied,
                    device: entry.address.to_string(),
                    source: Box::new(source),
                });
            }
            applied += 1;
        }
        debug!(applied, "batch command applied");
        Ok(applied)
    }

    /// Reads `count` contiguous registers starting at a word device.
    ///
    /// # Errors
    ///
    /// `McError::InvalidAddress` for bit devices, `McError::InvalidValue`
    /// for counts outside `1..=960`, plus the usual exchange failures.
    pub fn read_words(&mut self, device: &str, count: u16) -> Result<Vec<u16>> {
        let address: DeviceAddress = device.parse()?;
        if address.kind.unit() != AccessUnit::Word {
            return Err(McError::invalid_address(device, "block read of a bit device"));
        }
        let cmd = ReadCommand::new(self.config.header, address, count)?;
        let response = self.exchange(&cmd.to_bytes())?;
        response.check_end_code()?;
        let words = response.to_words()?;
        if words.len() != count as usize {
            return Err(McError::malformed_frame(format!(
                "requested {count} words, response carries {}",
                words.len()
            )));
        }
        Ok(words)
    }

    /// Writes contiguous registers starting at a word device.
    ///
    /// # Errors
    ///
    /// `McError::InvalidAddress` for bit devices, `McError::InvalidValue`
    /// for empty data or more than 720 words, plus the usual exchange
    /// failures.
    pub fn write_words(&mut self, device: &str, data: &[u16]) -> Result<()> {
        let address: DeviceAddress = device.parse()?;
        let cmd = WriteWordCommand::new(self.config.header, address, data)?;
        let response = self.exchange(&cmd.to_bytes())?;
        response.check_end_code()
    }

    /// Reads one register as up to two ASCII characters.
    pub fn read_ascii(&mut self, device: &str) -> Result<String> {
        let words = self.read_words(device, 1)?;
        Ok(word_to_ascii(words[0]))
    }

    /// Writes up to two ASCII characters into one register.
    ///
    /// # Errors
    ///
    /// `McError::InvalidValue` if the text is longer than two characters
    /// or not ASCII.
    pub fn write_ascii(&mut self, device: &str, text: &str) -> Result<()> {
        if text.len() > 2 || !text.is_ascii() {
            return Err(McError::invalid_value(
                device,
                format!("'{text}' does not fit one register as ASCII"),
            ));
        }
        self.write_words(device, &[ascii_to_word(text)])
    }

    /// Closes the connection, releasing the socket.
    ///
    /// Idempotent: closing an already-closed connection is a no-op.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            transport.shutdown();
            debug!(host = %self.config.host, "connection closed");
        }
        self.poisoned = false;
    }

    /// Returns whether the connection can still exchange frames.
    ///
    /// `false` once closed or after a timeout invalidated the stream.
    pub fn is_open(&self) -> bool {
        self.transport.is_some() && !self.poisoned
    }

    /// The configuration this connection was opened with.
    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    /// Range-checks, encodes and performs one write.
    fn write_value(&mut self, address: DeviceAddress, value: i32) -> Result<()> {
        address.check_value(value)?;
        let frame = match address.kind.unit() {
            AccessUnit::Bit => {
                WriteBitCommand::new(self.config.header, address, value == 1)?.to_bytes()
            }
            AccessUnit::Word => {
                // -1 and 65535 share a bit pattern; the truncation is the point
                WriteWordCommand::new(self.config.header, address, &[value as u16])?.to_bytes()
            }
        };
        let response = self.exchange(&frame)?;
        response.check_end_code()
    }

    /// Sends one frame and parses the response, tracking connection health.
    fn exchange(&mut self, frame: &[u8]) -> Result<McResponse> {
        if self.poisoned {
            return Err(McError::NotConnected);
        }
        let transport = self.transport.as_mut().ok_or(McError::NotConnected)?;

        let raw = match transport.send_receive(frame) {
            Ok(raw) => raw,
            Err(McError::Timeout) => {
                // Response bytes may still arrive later; there is no way to
                // resynchronize the stream, so this connection is done.
                self.poisoned = true;
                warn!(host = %self.config.host, "timeout, connection must be reopened");
                return Err(McError::Timeout);
            }
            Err(e) => return Err(e),
        };

        let response = McResponse::from_bytes(&raw)?;
        if !response.is_success() {
            let desc = end_code_description(response.end_code).unwrap_or("undocumented");
            warn!(code = response.end_code, desc, "PLC reported an error");
        }
        Ok(response)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}",
            self.config.host,
            self.config.port,
            if self.is_open() { "Open" } else { "Closed" }
        )
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread;

    /// Device the test double always answers with end code 0xC056.
    const POISON_OFFSET: u32 = 999;

    fn respond(end_code: u16, payload: &[u8]) -> Vec<u8> {
        let len = (2 + payload.len()) as u16;
        let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&end_code.to_le_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    /// Decodes one request body and produces the reply, backed by an
    /// in-memory device table keyed on (device code, device number).
    fn handle(memory: &mut HashMap<(u8, u32), u16>, body: &[u8]) -> Vec<u8> {
        let cmd = [body[2], body[3]];
        let bit_unit = [body[4], body[5]] == [0x01, 0x00];
        let offset = body[6] as u32 | (body[7] as u32) << 8 | (body[8] as u32) << 16;
        let code = body[9];
        let points = u16::from_le_bytes([body[10], body[11]]) as usize;

        if code == 0xA8 && offset == POISON_OFFSET {
            return respond(0xC056, &[]);
        }

        match cmd {
            [0x01, 0x04] => {
                if bit_unit {
                    let word = memory.get(&(code, offset)).copied().unwrap_or(0);
                    respond(0x0000, &[if word != 0 { 0x10 } else { 0x00 }])
                } else {
                    let mut payload = Vec::new();
                    for i in 0..points {
                        let word = memory.get(&(code, offset + i as u32)).copied().unwrap_or(0);
                        payload.extend_from_slice(&word.to_le_bytes());
                    }
                    respond(0x0000, &payload)
                }
            }
            [0x01, 0x14] => {
                if bit_unit {
                    let on = body[12] & 0xF0 != 0;
                    memory.insert((code, offset), on as u16);
                } else {
                    for i in 0..points {
                        let word = u16::from_le_bytes([body[12 + 2 * i], body[13 + 2 * i]]);
                        memory.insert((code, offset + i as u32), word);
                    }
                }
                respond(0x0000, &[])
            }
            _ => respond(0xC059, &[]),
        }
    }

    /// Spawns a PLC double serving binary 3E frames on one connection.
    fn spawn_plc() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut memory = HashMap::new();
            loop {
                let mut header = [0u8; 9];
                if stream.read_exact(&mut header).is_err() {
                    break;
                }
                let len = u16::from_le_bytes([header[7], header[8]]) as usize;
                let mut body = vec![0u8; len];
                if stream.read_exact(&mut body).is_err() {
                    break;
                }
                let reply = handle(&mut memory, &body);
                if stream.write_all(&reply).is_err() {
                    break;
                }
            }
        });
        addr
    }

    /// Spawns a server that accepts, reads the request, and never replies.
    fn spawn_silent_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 256];
            let _ = stream.read(&mut buf);
            thread::sleep(Duration::from_secs(5));
        });
        addr
    }

    fn open(addr: SocketAddr) -> Connection {
        Connection::open(
            ConnectConfig::new("127.0.0.1")
                .with_port(addr.port())
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap()
    }

    #[test]
    fn test_word_write_then_read() {
        let mut plc = open(spawn_plc());
        plc.write("D500", 30).unwrap();
        assert_eq!(plc.read("D500").unwrap(), 30);

        plc.write("D500", 3000).unwrap();
        assert_eq!(plc.read("D500").unwrap(), 3000);

        plc.write("D500", -2).unwrap();
        assert_eq!(plc.read("D500").unwrap(), -2);

        // 65535 and -1 share a bit pattern; reads are signed
        plc.write("D500", 65535).unwrap();
        assert_eq!(plc.read("D500").unwrap(), -1);
    }

    #[test]
    fn test_bit_write_then_read() {
        let mut plc = open(spawn_plc());
        plc.write("M1600", 1).unwrap();
        assert_eq!(plc.read("M1600").unwrap(), 1);

        plc.write("M1600", 0).unwrap();
        assert_eq!(plc.read("M1600").unwrap(), 0);
    }

    #[test]
    fn test_devices_are_independent() {
        let mut plc = open(spawn_plc());
        plc.write("D100", 7).unwrap();
        plc.write("D101", 8).unwrap();
        plc.write("M100", 1).unwrap();
        assert_eq!(plc.read("D100").unwrap(), 7);
        assert_eq!(plc.read("D101").unwrap(), 8);
        assert_eq!(plc.read("M100").unwrap(), 1);
        // same number, different kind
        assert_eq!(plc.read("SM100").unwrap(), 0);
    }

    #[test]
    fn test_exec_cmd_applies_in_order() {
        let mut plc = open(spawn_plc());
        let applied = plc.exec_cmd("D150=31,D200=5,D300=2,M1501=1").unwrap();
        assert_eq!(applied, 4);
        assert_eq!(plc.read("D150").unwrap(), 31);
        assert_eq!(plc.read("D200").unwrap(), 5);
        assert_eq!(plc.read("D300").unwrap(), 2);
        assert_eq!(plc.read("M1501").unwrap(), 1);
    }

    #[test]
    fn test_exec_cmd_parse_error_before_io() {
        let mut plc = open(spawn_plc());
        assert!(plc.exec_cmd("D150=31,NOPE").is_err());
        // nothing was written
        assert_eq!(plc.read("D150").unwrap(), 0);
    }

    #[test]
    fn test_exec_cmd_partial_failure() {
        let mut plc = open(spawn_plc());
        let err = plc.exec_cmd("D150=1,D999=2,D300=3").unwrap_err();
        match err {
            McError::BatchFailed {
                applied,
                device,
                source,
            } => {
                assert_eq!(applied, 1);
                assert_eq!(device, "D999");
                assert!(matches!(*source, McError::Plc { code: 0xC056 }));
            }
            other => panic!("expected BatchFailed, got {other:?}"),
        }
        // the write before the failure stuck, the one after never ran
        assert_eq!(plc.read("D150").unwrap(), 1);
        assert_eq!(plc.read("D300").unwrap(), 0);
    }

    #[test]
    fn test_plc_error_carries_end_code() {
        let mut plc = open(spawn_plc());
        match plc.read("D999").unwrap_err() {
            McError::Plc { code } => assert_eq!(code, 0xC056),
            other => panic!("expected Plc error, got {other:?}"),
        }
    }

    #[test]
    fn test_block_read_write() {
        let mut plc = open(spawn_plc());
        plc.write_words("D100", &[1, 2, 0xFFFF]).unwrap();
        assert_eq!(plc.read_words("D100", 3).unwrap(), vec![1, 2, 0xFFFF]);
        // single-device reads see the same registers
        assert_eq!(plc.read("D101").unwrap(), 2);

        assert!(plc.read_words("M100", 2).is_err());
        assert!(plc.write_words("D0", &[]).is_err());
    }

    #[test]
    fn test_ascii_round_trip() {
        let mut plc = open(spawn_plc());
        plc.write_ascii("D200", "AB").unwrap();
        assert_eq!(plc.read_ascii("D200").unwrap(), "AB");
        assert_eq!(plc.read("D200").unwrap(), 0x4241);

        assert!(plc.write_ascii("D200", "ABC").is_err());
        assert!(plc.write_ascii("D200", "é").is_err());
    }

    #[test]
    fn test_invalid_address_and_value() {
        let mut plc = open(spawn_plc());
        assert!(matches!(
            plc.read("G5"),
            Err(McError::InvalidAddress { .. })
        ));
        assert!(matches!(
            plc.write("D0", 70000),
            Err(McError::InvalidValue { .. })
        ));
        assert!(matches!(
            plc.write("M0", 2),
            Err(McError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_timeout_poisons_connection() {
        let mut plc = open(spawn_silent_server());
        assert!(matches!(plc.read("D0"), Err(McError::Timeout)));
        assert!(!plc.is_open());
        // further exchanges are refused without touching the socket
        assert!(matches!(plc.read("D0"), Err(McError::NotConnected)));
        assert!(matches!(plc.write("D0", 1), Err(McError::NotConnected)));
        plc.close();
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut plc = open(spawn_plc());
        assert!(plc.is_open());
        plc.close();
        assert!(!plc.is_open());
        plc.close(); // second close is a no-op
        assert!(matches!(plc.read("D0"), Err(McError::NotConnected)));
    }

    #[test]
    fn test_display_reflects_state() {
        let addr = spawn_plc();
        let mut plc = open(addr);
        assert_eq!(plc.to_string(), format!("127.0.0.1:{} Open", addr.port()));
        plc.close();
        assert_eq!(plc.to_string(), format!("127.0.0.1:{} Closed", addr.port()));
    }

    #[test]
    fn test_connect_failure() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let result = Connection::open(
            ConnectConfig::new("127.0.0.1")
                .with_port(addr.port())
                .with_timeout(Duration::from_millis(200)),
        );
        assert!(matches!(result, Err(McError::Connect { .. })));
    }
}
