//! Device kinds and address parsing.
//!
//! This module defines the [`DeviceKind`] enum for the FX5 device memory
//! categories the client can access, and [`DeviceAddress`], a parsed
//! `<Kind><Number>` device reference such as `D500` or `M1600`.
//!
//! # Device Kinds Overview
//!
//! | Kind | Description | Unit | Numbering | Max |
//! |------|-------------|------|-----------|-----|
//! | D | Data register | word | decimal | 7999 |
//! | SD | Special data register | word | decimal | 11999 |
//! | R | File register | word | decimal | 32767 |
//! | W | Link register | word | hexadecimal | 7FFF |
//! | M | Internal relay | bit | decimal | 32767 |
//! | SM | Special relay | bit | decimal | 9999 |
//! | L | Latch relay | bit | decimal | 32767 |
//! | F | Annunciator | bit | decimal | 32767 |
//! | X | Input | bit | octal | 1777 |
//! | Y | Output | bit | octal | 1777 |
//!
//! Device numbers are bounded by the FX5 maximum parameter capacity; the
//! PLC itself rejects numbers beyond its configured capacity with end code
//! `0xC056`.
//!
//! # Example
//!
//! ```
//! use fx5_mc::{DeviceAddress, DeviceKind};
//!
//! let addr: DeviceAddress = "D500".parse().unwrap();
//! assert_eq!(addr.kind, DeviceKind::D);
//! assert_eq!(addr.offset, 500);
//! assert_eq!(addr.to_string(), "D500");
//!
//! // X and Y are numbered in octal
//! let input: DeviceAddress = "X17".parse().unwrap();
//! assert_eq!(input.offset, 0o17);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{McError, Result};

/// Access unit of a device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessUnit {
    /// One point is a single bit (relays, inputs, outputs).
    Bit,
    /// One point is a 16-bit word (registers).
    Word,
}

/// Device memory categories addressable through the 3E frame.
///
/// Each kind maps to a fixed device code byte in the binary frame and
/// carries its numbering base and maximum device number. The codes are
/// pinned by the MELSEC communication specification, not by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// D — data register (word).
    D,
    /// SD — special data register (word).
    SD,
    /// R — file register (word).
    R,
    /// W — link register (word, hexadecimal numbering).
    W,
    /// M — internal relay (bit).
    M,
    /// SM — special relay (bit).
    SM,
    /// L — latch relay (bit).
    L,
    /// F — annunciator (bit).
    F,
    /// X — input (bit, octal numbering).
    X,
    /// Y — output (bit, octal numbering).
    Y,
}

impl DeviceKind {
    /// Returns the device code byte used in binary 3E frames.
    pub(crate) fn code(self) -> u8 {
        match self {
            DeviceKind::D => 0xA8,
            DeviceKind::SD => 0xA9,
            DeviceKind::R => 0xAF,
            DeviceKind::W => 0xB4,
            DeviceKind::M => 0x90,
            DeviceKind::SM => 0x91,
            DeviceKind::L => 0x92,
            DeviceKind::F => 0x93,
            DeviceKind::X => 0x9C,
            DeviceKind::Y => 0x9D,
        }
    }

    /// Returns whether this kind is accessed bit-wise or word-wise.
    pub fn unit(self) -> AccessUnit {
        match self {
            DeviceKind::D | DeviceKind::SD | DeviceKind::R | DeviceKind::W => AccessUnit::Word,
            _ => AccessUnit::Bit,
        }
    }

    /// Returns the numbering base of this kind (X/Y octal, W hex, rest decimal).
    pub fn radix(self) -> u32 {
        match self {
            DeviceKind::X | DeviceKind::Y => 8,
            DeviceKind::W => 16,
            _ => 10,
        }
    }

    /// Returns the highest valid device number for this kind.
    pub fn max_offset(self) -> u32 {
        match self {
            DeviceKind::D => 7999,
            DeviceKind::SD => 11999,
            DeviceKind::R => 32767,
            DeviceKind::W => 0x7FFF,
            DeviceKind::M => 32767,
            DeviceKind::SM => 9999,
            DeviceKind::L => 32767,
            DeviceKind::F => 32767,
            DeviceKind::X => 0o1777,
            DeviceKind::Y => 0o1777,
        }
    }

    /// Looks up a kind by its textual prefix (`"D"`, `"SM"`, ...).
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "D" => Some(DeviceKind::D),
            "SD" => Some(DeviceKind::SD),
            "R" => Some(DeviceKind::R),
            "W" => Some(DeviceKind::W),
            "M" => Some(DeviceKind::M),
            "SM" => Some(DeviceKind::SM),
            "L" => Some(DeviceKind::L),
            "F" => Some(DeviceKind::F),
            "X" => Some(DeviceKind::X),
            "Y" => Some(DeviceKind::Y),
            _ => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            DeviceKind::D => "D",
            DeviceKind::SD => "SD",
            DeviceKind::R => "R",
            DeviceKind::W => "W",
            DeviceKind::M => "M",
            DeviceKind::SM => "SM",
            DeviceKind::L => "L",
            DeviceKind::F => "F",
            DeviceKind::X => "X",
            DeviceKind::Y => "Y",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed device reference: kind plus device number.
///
/// Immutable once constructed. Parsing accepts `<Kind><Number>` with the
/// number in the kind's numbering base, and rejects unknown kinds, empty
/// or non-numeric suffixes, and numbers beyond the kind's maximum.
///
/// # Example
///
/// ```
/// use fx5_mc::DeviceAddress;
///
/// let addr: DeviceAddress = "M1600".parse().unwrap();
/// assert_eq!(addr.to_string(), "M1600");
///
/// assert!("G100".parse::<DeviceAddress>().is_err());
/// assert!("D".parse::<DeviceAddress>().is_err());
/// assert!("D99999".parse::<DeviceAddress>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    /// Device kind.
    pub kind: DeviceKind,
    /// Device number within the kind.
    pub offset: u32,
}

impl DeviceAddress {
    /// Creates an address from an already-known kind and number.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidAddress` if the number exceeds the kind's
    /// maximum.
    pub fn new(kind: DeviceKind, offset: u32) -> Result<Self> {
        if offset > kind.max_offset() {
            return Err(McError::invalid_address(
                format!("{kind}{offset}"),
                format!("device number exceeds {} maximum {}", kind, kind.max_offset()),
            ));
        }
        Ok(Self { kind, offset })
    }

    /// Parses a textual device reference such as `"D500"` or `"X17"`.
    ///
    /// Two-letter prefixes win over one-letter prefixes, so `SM100` is the
    /// special relay 100 and not an error. Kind letters are uppercase, as
    /// in the GX Works device notation.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidAddress` when the prefix is not a known
    /// device kind, the remainder is not a number in the kind's base, or
    /// the number is out of range.
    pub fn parse(text: &str) -> Result<Self> {
        let mut split = None;
        for n in [2, 1] {
            if let Some(kind) = text.get(..n).and_then(DeviceKind::from_prefix) {
                split = Some((kind, &text[n..]));
                break;
            }
        }
        let (kind, digits) =
            split.ok_or_else(|| McError::invalid_address(text, "unknown device kind"))?;

        if digits.is_empty() {
            return Err(McError::invalid_address(text, "missing device number"));
        }
        // from_str_radix tolerates a leading sign, the device notation does not
        if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(McError::invalid_address(text, "device number is not a number"));
        }
        let offset = u32::from_str_radix(digits, kind.radix()).map_err(|_| {
            McError::invalid_address(
                text,
                format!("device number is not a base-{} number", kind.radix()),
            )
        })?;
        if offset > kind.max_offset() {
            return Err(McError::invalid_address(
                text,
                format!("device number exceeds {} maximum {}", kind, kind.max_offset()),
            ));
        }

        Ok(Self { kind, offset })
    }

    /// Checks that `value` is representable on this device.
    ///
    /// Bit devices accept `0` or `1`. Word devices accept any value whose
    /// bit pattern fits in 16 bits, signed or unsigned (`-32768..=65535`).
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidValue` otherwise.
    pub fn check_value(&self, value: i32) -> Result<()> {
        match self.kind.unit() {
            AccessUnit::Bit => {
                if value == 0 || value == 1 {
                    Ok(())
                } else {
                    Err(McError::invalid_value(
                        self.to_string(),
                        format!("bit devices accept only 0 or 1, got {value}"),
                    ))
                }
            }
            AccessUnit::Word => {
                if (-32768..=65535).contains(&value) {
                    Ok(())
                } else {
                    Err(McError::invalid_value(
                        self.to_string(),
                        format!("word devices accept -32768..=65535, got {value}"),
                    ))
                }
            }
        }
    }
}

impl FromStr for DeviceAddress {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.radix() {
            8 => write!(f, "{}{:o}", self.kind, self.offset),
            16 => write!(f, "{}{:X}", self.kind, self.offset),
            _ => write!(f, "{}{}", self.kind, self.offset),
        }
    }
}
