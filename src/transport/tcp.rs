//! # Raw TCP Transport
//!
//! Blocking socket I/O toward the device's raw print port.
//!
//! ## Chunked Writes
//!
//! Job streams are written in 4096-byte chunks — one device receive block
//! per socket write. TCP would happily take the whole stream at once, but
//! matching the device's block granularity keeps backpressure aligned with
//! its buffer drain and makes a mid-stream failure surface at a block
//! boundary instead of megabytes later.
//!
//! ## Bounded Everything
//!
//! Connect, write, and read are all bounded by explicit timeouts. A silent
//! or hung device must never suspend the caller indefinitely; it becomes a
//! `ConnectionLost` or `StatusTimeout` instead.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::HermanoError;
use crate::protocol::status::STATUS_FRAME_LEN;

/// Default device print port (raw print data, VC-500W and most network
/// printers).
pub const DEFAULT_PORT: u16 = 9100;

/// Write chunk size, matching the device receive block.
pub const CHUNK_SIZE: usize = 4096;

/// Upper bound on any single chunk write. Generous — a wedged device
/// stalling a 4 KiB write for this long is not coming back.
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// # TCP Printer Transport
///
/// One connection, one job. The socket is closed when the transport is
/// dropped, so every exit path out of a session — success, device fault,
/// I/O error, panic unwind — releases it.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Open a connection with a bounded connect timeout.
    ///
    /// `addr` is `host:port`; hostnames resolve and each resolved address
    /// is tried in order until one connects.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, HermanoError> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| HermanoError::ConnectionLost(format!("cannot resolve {}: {}", addr, e)))?
            .collect();

        let mut last_err = None;
        for candidate in &candidates {
            match TcpStream::connect_timeout(candidate, timeout) {
                Ok(stream) => {
                    // One frame at a time; don't let Nagle sit on the
                    // finish command.
                    stream.set_nodelay(true).map_err(HermanoError::Io)?;
                    stream
                        .set_write_timeout(Some(WRITE_TIMEOUT))
                        .map_err(HermanoError::Io)?;
                    tracing::debug!(peer = %candidate, "Connected to device");
                    return Ok(Self {
                        stream,
                        peer: *candidate,
                    });
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => HermanoError::ConnectionLost(format!("connect to {} failed: {}", addr, e)),
            None => HermanoError::ConnectionLost(format!("{} resolved to no addresses", addr)),
        })
    }

    /// The address actually connected to.
    #[inline]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Write the full byte stream, chunked.
    ///
    /// Any write failure — peer reset, broken pipe, write timeout — maps to
    /// [`HermanoError::ConnectionLost`]. The caller must treat that as a
    /// dead session: partial job bytes have reached the device and
    /// resending risks double output on physical media.
    pub fn send(&mut self, data: &[u8]) -> Result<(), HermanoError> {
        for chunk in data.chunks(CHUNK_SIZE) {
            self.stream
                .write_all(chunk)
                .map_err(|e| HermanoError::ConnectionLost(format!("write failed: {}", e)))?;
        }
        self.stream
            .flush()
            .map_err(|e| HermanoError::ConnectionLost(format!("flush failed: {}", e)))?;
        Ok(())
    }

    /// Read one fixed-length status frame with a bounded timeout.
    ///
    /// Timeout maps to [`HermanoError::StatusTimeout`]; a peer that closes
    /// or resets before a full frame arrives maps to
    /// [`HermanoError::ConnectionLost`].
    pub fn read_status_frame(
        &mut self,
        timeout: Duration,
    ) -> Result<[u8; STATUS_FRAME_LEN], HermanoError> {
        self.stream
            .set_read_timeout(Some(timeout))
            .map_err(HermanoError::Io)?;

        let mut frame = [0u8; STATUS_FRAME_LEN];
        match self.stream.read_exact(&mut frame) {
            Ok(()) => Ok(frame),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Err(HermanoError::StatusTimeout)
            }
            Err(e) => Err(HermanoError::ConnectionLost(format!(
                "status read failed: {}",
                e
            ))),
        }
    }

    /// Shut the connection down explicitly.
    ///
    /// Dropping the transport closes the socket anyway; this exists so a
    /// session can log the close as a state transition and so tests can
    /// assert the FIN reached the fake device.
    pub fn close(self) {
        // NotConnected just means the peer beat us to it.
        let _ = self.stream.shutdown(Shutdown::Both);
        tracing::debug!(peer = %self.peer, "Connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::net::TcpListener;
    use std::thread;

    fn local_listener() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    #[test]
    fn test_connect_refused() {
        // Bind a port, learn it, then free it: connecting afterwards is
        // refused rather than hanging.
        let (listener, addr) = local_listener();
        drop(listener);
        let err = TcpTransport::connect(&addr, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HermanoError::ConnectionLost(_)));
    }

    #[test]
    fn test_unresolvable_host() {
        let err =
            TcpTransport::connect("no-such-host.invalid:9100", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HermanoError::ConnectionLost(_)));
    }

    #[test]
    fn test_send_and_read_frame() {
        let (listener, addr) = local_listener();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            sock.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"hello");
            sock.write_all(&[0x02, b'S', 0, 0, 50, 0, 0, 0x03]).unwrap();
        });

        let mut transport = TcpTransport::connect(&addr, Duration::from_secs(2)).unwrap();
        transport.send(b"hello").unwrap();
        let frame = transport.read_status_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(frame[4], 50);
        transport.close();
        server.join().unwrap();
    }

    #[test]
    fn test_status_read_times_out() {
        let (listener, addr) = local_listener();
        let server = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            // Hold the socket open, never answer.
            thread::sleep(Duration::from_millis(500));
            drop(sock);
        });

        let mut transport = TcpTransport::connect(&addr, Duration::from_secs(2)).unwrap();
        let err = transport
            .read_status_frame(Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, HermanoError::StatusTimeout));
        server.join().unwrap();
    }

    #[test]
    fn test_peer_close_is_connection_lost() {
        let (listener, addr) = local_listener();
        let server = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            drop(sock); // close immediately, no status
        });

        let mut transport = TcpTransport::connect(&addr, Duration::from_secs(2)).unwrap();
        server.join().unwrap();
        let err = transport
            .read_status_frame(Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, HermanoError::ConnectionLost(_)));
    }
}
