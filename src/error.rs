//! Error types for MC protocol communication.

use std::io;
use thiserror::Error;

/// Result type alias for MC protocol operations.
pub type Result<T> = std::result::Result<T, McError>;

/// Errors that can occur during MC protocol communication.
#[derive(Debug, Error)]
pub enum McError {
    /// Malformed device text or out-of-range device number.
    #[error("invalid device address '{text}': {reason}")]
    InvalidAddress {
        /// The device text as given by the caller.
        text: String,
        /// Description of the addressing error.
        reason: String,
    },

    /// Value outside the range representable by the device kind.
    #[error("invalid value for {device}: {reason}")]
    InvalidValue {
        /// Device the value was destined for.
        device: String,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Socket establishment failure.
    #[error("connection to {endpoint} failed: {source}")]
    Connect {
        /// Endpoint that refused or could not be reached.
        endpoint: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// No complete response frame within the configured deadline.
    ///
    /// A timeout leaves an unknown amount of response data in flight. The
    /// connection refuses further exchanges until it is closed and a fresh
    /// one is opened.
    #[error("communication timeout")]
    Timeout,

    /// Response failed structural validation.
    #[error("malformed response frame: {reason}")]
    MalformedFrame {
        /// Description of the structural defect.
        reason: String,
    },

    /// PLC returned a non-zero completion end code.
    ///
    /// The code is surfaced as-is; see [`end_code_description`] for the
    /// subset of codes the FX5 manuals document.
    #[error("PLC error: end code 0x{code:04X}")]
    Plc {
        /// End code from the response frame.
        code: u16,
    },

    /// Operation attempted on a connection that is closed or was
    /// invalidated by a timeout.
    #[error("connection is not open")]
    NotConnected,

    /// A batch command aborted partway through.
    ///
    /// Writes before `applied` have already taken effect on the PLC;
    /// batch execution is not transactional.
    #[error("batch aborted after {applied} writes at '{device}': {source}")]
    BatchFailed {
        /// Number of writes applied before the failure.
        applied: usize,
        /// Device text of the entry that failed.
        device: String,
        /// The failure that stopped the batch.
        #[source]
        source: Box<McError>,
    },

    /// I/O error on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl McError {
    /// Creates a new `InvalidAddress` error.
    pub fn invalid_address(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidValue` error.
    pub fn invalid_value(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `MalformedFrame` error.
    pub fn malformed_frame(reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            reason: reason.into(),
        }
    }

    /// Creates a new `Plc` error from a response end code.
    pub fn plc_error(code: u16) -> Self {
        Self::Plc { code }
    }
}

/// Returns the documented meaning of an FX5 end code, if known.
///
/// The FX5 manuals list far more codes than a client can sensibly act on;
/// this table covers the SLMP access errors a device read/write can
/// actually provoke. Codes in `0x4000..=0x4FFF` are CPU module errors and
/// are reported through the CPU's own diagnostics.
///
/// # Example
///
/// ```
/// use fx5_mc::end_code_description;
///
/// assert!(end_code_description(0xC056).unwrap().contains("maximum address"));
/// assert!(end_code_description(0x1234).is_none());
/// ```
pub fn end_code_description(code: u16) -> Option<&'static str> {
    let desc = match code {
        0x0055 => "write refused: CPU is in RUN and online change is disabled",
        0xC050 => "ASCII data received that cannot be converted to binary",
        0xC051 => "bit device count outside the allowed range",
        0xC052 => "word device count outside the allowed range",
        0xC053 => "random-access bit device count outside the allowed range",
        0xC054 => "random-access word device count outside the allowed range",
        0xC056 => "read or write request exceeds the maximum address",
        0xC058 => "request length after ASCII-binary conversion does not match the data count",
        0xC059 => "command or subcommand not usable with this CPU",
        0xC05B => "CPU cannot read or write the specified device",
        0xC05C => "request content error (e.g. bit access to a word device)",
        0xC05F => "request cannot be executed on the target CPU module",
        0xC060 => "request content error in bit device data",
        0xC061 => "request length does not match the data count",
        0xC06F => "request data code does not match the configured communication data code",
        0xC0D8 => "specified block count outside the allowed range",
        0xC200 => "remote password mismatch",
        0xC201 => "port is locked by the remote password",
        0xC204 => "request came from a device other than the one that unlocked the port",
        _ => return None,
    };
    Some(desc)
}
