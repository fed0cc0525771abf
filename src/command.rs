//! Request encoding for device batch read and batch write.
//!
//! Each command owns everything needed to serialize one complete request
//! frame: the access route, the target device, and for writes the payload.
//! Commands are ephemeral; build one, call [`to_bytes`](ReadCommand::to_bytes),
//! hand the frame to the transport.
//!
//! # Command Codes
//!
//! | Command | Code | Subcommand |
//! |---------|------|------------|
//! | Batch read | `0x0401` | `0x0000` word unit, `0x0001` bit unit |
//! | Batch write | `0x1401` | `0x0000` word unit, `0x0001` bit unit |
//!
//! Codes and subcommands are emitted little-endian, like every multi-byte
//! field in the binary frame.
//!
//! # Example
//!
//! ```
//! use fx5_mc::{FrameHeader, ReadCommand};
//!
//! let cmd = ReadCommand::new(FrameHeader::default(), "D500".parse().unwrap(), 1).unwrap();
//! let frame = cmd.to_bytes();
//! assert_eq!(frame.len(), 21);
//! ```

use crate::device::{AccessUnit, DeviceAddress};
use crate::error::{McError, Result};
use crate::frame::FrameHeader;

/// Batch read command code, little-endian.
pub(crate) const CMD_BATCH_READ: [u8; 2] = [0x01, 0x04];
/// Batch write command code, little-endian.
pub(crate) const CMD_BATCH_WRITE: [u8; 2] = [0x01, 0x14];
/// Bit-unit subcommand, little-endian.
pub(crate) const SUB_BIT: [u8; 2] = [0x01, 0x00];
/// Word-unit subcommand, little-endian.
pub(crate) const SUB_WORD: [u8; 2] = [0x00, 0x00];

/// Maximum word points per batch read frame.
pub const MAX_READ_POINTS: u16 = 960;
/// Maximum word points per batch write frame.
pub const MAX_WRITE_POINTS: u16 = 720;

/// Command body length without payload: command (2) + subcommand (2) +
/// device number (3) + device code (1) + point count (2).
const BODY_BASE_LEN: usize = 10;

fn subcommand(unit: AccessUnit) -> [u8; 2] {
    match unit {
        AccessUnit::Bit => SUB_BIT,
        AccessUnit::Word => SUB_WORD,
    }
}

/// Appends the device number (3 bytes, little-endian) and device code.
fn push_device(buf: &mut Vec<u8>, address: DeviceAddress) {
    buf.push(address.offset as u8);
    buf.push((address.offset >> 8) as u8);
    buf.push((address.offset >> 16) as u8);
    buf.push(address.kind.code());
}

/// Batch read request for one or more points starting at a device.
///
/// Bit devices are read one point at a time; word devices up to
/// [`MAX_READ_POINTS`] contiguous registers.
#[derive(Debug, Clone)]
pub struct ReadCommand {
    header: FrameHeader,
    address: DeviceAddress,
    count: u16,
}

impl ReadCommand {
    /// Creates a new batch read command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidValue` if `count` is zero, exceeds
    /// [`MAX_READ_POINTS`], or is more than one for a bit device.
    pub fn new(header: FrameHeader, address: DeviceAddress, count: u16) -> Result<Self> {
        if count == 0 {
            return Err(McError::invalid_value(
                address.to_string(),
                "read count must be greater than 0",
            ));
        }
        if count > MAX_READ_POINTS {
            return Err(McError::invalid_value(
                address.to_string(),
                format!("read count must not exceed {MAX_READ_POINTS}"),
            ));
        }
        if address.kind.unit() == AccessUnit::Bit && count > 1 {
            return Err(McError::invalid_value(
                address.to_string(),
                "bit devices are read one point at a time",
            ));
        }
        Ok(Self {
            header,
            address,
            count,
        })
    }

    /// Serializes the command to one request frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.to_bytes(BODY_BASE_LEN);
        bytes.extend_from_slice(&CMD_BATCH_READ);
        bytes.extend_from_slice(&subcommand(self.address.kind.unit()));
        push_device(&mut bytes, self.address);
        bytes.extend_from_slice(&self.count.to_le_bytes());
        bytes
    }

    /// Number of points this command requests.
    pub fn count(&self) -> u16 {
        self.count
    }
}

/// Batch write request carrying one or more register values.
#[derive(Debug, Clone)]
pub struct WriteWordCommand {
    header: FrameHeader,
    address: DeviceAddress,
    data: Vec<u16>,
}

impl WriteWordCommand {
    /// Creates a new word batch write command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidAddress` if the device is bit-addressed,
    /// `McError::InvalidValue` if `data` is empty or exceeds
    /// [`MAX_WRITE_POINTS`] words.
    pub fn new(header: FrameHeader, address: DeviceAddress, data: &[u16]) -> Result<Self> {
        if address.kind.unit() != AccessUnit::Word {
            return Err(McError::invalid_address(
                address.to_string(),
                "word write to a bit device",
            ));
        }
        if data.is_empty() {
            return Err(McError::invalid_value(
                address.to_string(),
                "write data must not be empty",
            ));
        }
        if data.len() > MAX_WRITE_POINTS as usize {
            return Err(McError::invalid_value(
                address.to_string(),
                format!("write data must not exceed {MAX_WRITE_POINTS} words"),
            ));
        }
        Ok(Self {
            header,
            address,
            data: data.to_vec(),
        })
    }

    /// Serializes the command to one request frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.to_bytes(BODY_BASE_LEN + self.data.len() * 2);
        bytes.extend_from_slice(&CMD_BATCH_WRITE);
        bytes.extend_from_slice(&SUB_WORD);
        push_device(&mut bytes, self.address);
        bytes.extend_from_slice(&(self.data.len() as u16).to_le_bytes());
        for word in &self.data {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// Batch write request for a single bit device.
#[derive(Debug, Clone)]
pub struct WriteBitCommand {
    header: FrameHeader,
    address: DeviceAddress,
    on: bool,
}

impl WriteBitCommand {
    /// Creates a new single-bit write command.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidAddress` if the device is word-addressed.
    pub fn new(header: FrameHeader, address: DeviceAddress, on: bool) -> Result<Self> {
        if address.kind.unit() != AccessUnit::Bit {
            return Err(McError::invalid_address(
                address.to_string(),
                "bit write to a word device",
            ));
        }
        Ok(Self {
            header,
            address,
            on,
        })
    }

    /// Serializes the command to one request frame.
    ///
    /// Bit payloads pack two points per byte; a single point occupies the
    /// high nibble, `0x10` for ON.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.to_bytes(BODY_BASE_LEN + 1);
        bytes.extend_from_slice(&CMD_BATCH_WRITE);
        bytes.extend_from_slice(&SUB_BIT);
        push_device(&mut bytes, self.address);
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(if self.on { 0x10 } else { 0x00 });
        bytes
    }
}
