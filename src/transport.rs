//! TCP transport layer.
//!
//! [`TcpTransport`] owns the one socket a connection uses and handles the
//! byte-level exchange: write a full request frame, then read exactly one
//! response frame back. Framing works off the fixed header — the transport
//! reads the nine header bytes first, then the remainder the length field
//! declares. It knows the frame envelope but nothing about commands or
//! device semantics.
//!
//! Exactly one request is in flight at a time; `send_receive` takes
//! `&mut self` so overlapping exchanges on one transport are impossible.
//!
//! # Constants
//!
//! - [`DEFAULT_PORT`] - default SLMP TCP port used by the FX5 setups this
//!   client targets (2555)
//! - [`DEFAULT_TIMEOUT`] - default connect/read/write timeout (2 seconds)
//! - [`MAX_FRAME_SIZE`] - upper bound on an accepted response frame

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{McError, Result};
use crate::frame::{response_remaining_len, RESPONSE_HEADER_SIZE};

/// Default TCP port for the PLC's SLMP connection.
pub const DEFAULT_PORT: u16 = 2555;

/// Default timeout for connect, read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum accepted response frame size.
///
/// A full 960-word batch read response is 1931 bytes; anything declaring
/// more than this is treated as a framing error rather than read to the
/// bitter end.
pub const MAX_FRAME_SIZE: usize = 4096;

/// Maps a socket error on an established stream to the protocol error kinds.
fn map_stream_err(e: io::Error) -> McError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => McError::Timeout,
        io::ErrorKind::UnexpectedEof => {
            McError::malformed_frame("connection closed mid-frame")
        }
        _ => McError::Io(e),
    }
}

/// TCP transport for 3E frame exchange.
///
/// Blocking I/O with one timeout applied to connect, send and receive.
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Connects to the PLC and configures socket timeouts.
    ///
    /// # Errors
    ///
    /// Returns `McError::Connect` when the host does not resolve or the
    /// TCP connection is refused, unreachable, or times out.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let endpoint = format!("{host}:{port}");
        let connect_err = |source: io::Error| McError::Connect {
            endpoint: endpoint.clone(),
            source,
        };

        let peer = (host, port)
            .to_socket_addrs()
            .map_err(connect_err)?
            .next()
            .ok_or_else(|| {
                connect_err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ))
            })?;
        let stream = TcpStream::connect_timeout(&peer, timeout).map_err(connect_err)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        debug!(%peer, "connected");

        Ok(Self { stream, peer })
    }

    /// Sends one request frame and receives one response frame.
    ///
    /// Blocks until the complete response arrives or the timeout fires.
    /// The returned buffer contains the whole frame, header included.
    ///
    /// # Errors
    ///
    /// - `McError::Timeout` - no complete frame within the deadline; the
    ///   stream may still carry a partial frame, so the caller must treat
    ///   the connection as unusable
    /// - `McError::MalformedFrame` - bad subheader, implausible declared
    ///   length, or the peer closed the stream mid-frame
    /// - `McError::Io` - any other socket failure
    pub fn send_receive(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        self.stream.write_all(frame).map_err(map_stream_err)?;
        trace!(len = frame.len(), "request frame sent");

        let mut header = [0u8; RESPONSE_HEADER_SIZE];
        self.stream.read_exact(&mut header).map_err(map_stream_err)?;
        let remaining = response_remaining_len(&header)?;
        if RESPONSE_HEADER_SIZE + remaining > MAX_FRAME_SIZE {
            return Err(McError::malformed_frame(format!(
                "declared length {remaining} exceeds the {MAX_FRAME_SIZE}-byte frame cap"
            )));
        }

        let mut buf = vec![0u8; RESPONSE_HEADER_SIZE + remaining];
        buf[..RESPONSE_HEADER_SIZE].copy_from_slice(&header);
        self.stream
            .read_exact(&mut buf[RESPONSE_HEADER_SIZE..])
            .map_err(map_stream_err)?;
        trace!(len = buf.len(), "response frame received");
        Ok(buf)
    }

    /// Shuts the socket down in both directions. Errors are ignored; the
    /// peer may already be gone.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// Returns the remote PLC address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("peer", &self.peer)
            .field("local_addr", &self.stream.local_addr().ok())
            .finish()
    }
}
