//! Batch command parsing.
//!
//! A batch command is a comma-separated list of `DEVICE=VALUE` pairs, e.g.
//! `D150=31,D200=5,D300=2,M1501=1`. [`BatchCommand::parse`] turns the whole
//! string into addressed, range-checked entries before any I/O happens, so
//! a syntax error anywhere in the string fails the command without touching
//! the PLC. Execution order is the textual order, left to right.
//!
//! The syntax is strict: no whitespace around `,` or `=`, values are
//! decimal integers.
//!
//! # Example
//!
//! ```
//! use fx5_mc::BatchCommand;
//!
//! let batch: BatchCommand = "D150=31,D200=5,M1501=1".parse().unwrap();
//! assert_eq!(batch.len(), 3);
//! assert_eq!(batch.entries()[0].address.to_string(), "D150");
//! assert_eq!(batch.entries()[0].value, 31);
//! ```

use std::str::FromStr;

use crate::device::DeviceAddress;
use crate::error::{McError, Result};

/// One write in a batch command: target device and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchEntry {
    /// Target device.
    pub address: DeviceAddress,
    /// Value to write, already checked against the device kind.
    pub value: i32,
}

/// An ordered sequence of writes parsed from one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCommand {
    entries: Vec<BatchEntry>,
}

impl BatchCommand {
    /// Parses a `DEVICE=VALUE,DEVICE=VALUE,...` command string.
    ///
    /// Every pair is parsed and range-checked up front; entries keep the
    /// order they appear in the string.
    ///
    /// # Errors
    ///
    /// - `McError::InvalidAddress` - empty string, a pair without `=`, or
    ///   a device text that does not parse
    /// - `McError::InvalidValue` - a value that is not an integer or does
    ///   not fit the device kind
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(McError::invalid_address(text, "empty batch command"));
        }

        let mut entries = Vec::new();
        for pair in text.split(',') {
            let (device, value_text) = pair.split_once('=').ok_or_else(|| {
                McError::invalid_address(pair, "expected DEVICE=VALUE")
            })?;
            let address: DeviceAddress = device.parse()?;
            let value: i32 = value_text.parse().map_err(|_| {
                McError::invalid_value(device, format!("'{value_text}' is not an integer"))
            })?;
            address.check_value(value)?;
            entries.push(BatchEntry { address, value });
        }

        Ok(Self { entries })
    }

    /// The parsed entries, in execution order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of writes in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the batch holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for BatchCommand {
    type Err = McError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a BatchCommand {
    type Item = &'a BatchEntry;
    type IntoIter = std::slice::Iter<'a, BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceKind;

    #[test]
    fn test_parse_preserves_order() {
        let batch = BatchCommand::parse("D150=31,D200=5,D300=2,M1501=1").unwrap();
        assert_eq!(batch.len(), 4);

        let devices: Vec<String> = batch
            .entries()
            .iter()
            .map(|e| e.address.to_string())
            .collect();
        assert_eq!(devices, ["D150", "D200", "D300", "M1501"]);

        let values: Vec<i32> = batch.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, [31, 5, 2, 1]);
    }

    #[test]
    fn test_parse_single_pair() {
        let batch = BatchCommand::parse("M1600=1").unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.entries()[0].address.kind, DeviceKind::M);
        assert_eq!(batch.entries()[0].value, 1);
    }

    #[test]
    fn test_parse_negative_word_value() {
        let batch = BatchCommand::parse("D0=-100").unwrap();
        assert_eq!(batch.entries()[0].value, -100);
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            BatchCommand::parse("D150"),
            Err(McError::InvalidAddress { .. })
        ));
        assert!(matches!(
            BatchCommand::parse("D150=31,D200"),
            Err(McError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_device() {
        assert!(BatchCommand::parse("G100=1").is_err());
        assert!(BatchCommand::parse("D150=31,=5").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_value() {
        assert!(matches!(
            BatchCommand::parse("D150=abc"),
            Err(McError::InvalidValue { .. })
        ));
        // bit device only takes 0 or 1
        assert!(matches!(
            BatchCommand::parse("M1501=2"),
            Err(McError::InvalidValue { .. })
        ));
        // out of word range
        assert!(BatchCommand::parse("D150=70000").is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(BatchCommand::parse("").is_err());
        assert!(BatchCommand::parse("D150=31,").is_err());
    }

    #[test]
    fn test_iteration() {
        let batch = BatchCommand::parse("D1=1,D2=2").unwrap();
        let total: i32 = (&batch).into_iter().map(|e| e.value).sum();
        assert_eq!(total, 3);
    }
}
