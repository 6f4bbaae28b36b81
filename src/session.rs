//! # Print Session
//!
//! Drives one [`PrintJob`] over one TCP connection and maps the device's
//! answer to an outcome.
//!
//! ## State Machine
//!
//! ```text
//! Idle → Connecting → Sending → AwaitingStatus → {Completed | Failed} → Closed
//! ```
//!
//! A session exists for exactly one job: [`PrintSession::submit`] consumes
//! the session *and* the job, so reuse and double-submission are compile
//! errors rather than runtime bugs. The socket is closed on every exit
//! path — success, device fault, timeout, I/O error — before `submit`
//! returns.
//!
//! ## No Internal Retries
//!
//! The session never resends anything. Once bytes start flowing, the device
//! may already be committing them to physical media; a blind resend risks
//! printing the label twice. Retry policy belongs to the caller, who can
//! distinguish a retryable `StatusTimeout` from a `Device(NoMedia)` that
//! needs a human.
//!
//! ## One Session Per Device
//!
//! The device processes one job at a time and its protocol has no
//! multiplexing, so [`print`] and [`query_status`] serialize through a
//! per-device-address lock held for the whole call. There is no ambient
//! connection object and no pooling — each submit opens and closes its own
//! socket.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HermanoError;
use crate::job::PrintJob;
use crate::protocol::commands;
use crate::protocol::status::{DeviceStatus, StatusResponse};
use crate::transport::TcpTransport;

/// Default bound on opening the TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on waiting for the device's status frame.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Sending,
    AwaitingStatus,
    Completed,
    Failed,
    Closed,
}

/// A successfully completed print.
///
/// `media_remaining` is the device's consumable-media percentage when it
/// reports one — auxiliary info for the caller's UI, never an error signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub media_remaining: Option<u8>,
}

/// One print session: one connection, one job, then gone.
#[derive(Debug)]
pub struct PrintSession {
    connect_timeout: Duration,
    status_timeout: Duration,
    state: SessionState,
}

impl Default for PrintSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintSession {
    /// A session with the default timeouts.
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT, STATUS_TIMEOUT)
    }

    /// A session with explicit connect and status-read bounds.
    pub fn with_timeouts(connect_timeout: Duration, status_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            status_timeout,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "Session transition");
        self.state = next;
    }

    /// Send a job to the device at `host:port` and wait for its verdict.
    ///
    /// Consumes the session and the job. The connection is closed before
    /// this returns, whatever happened.
    ///
    /// ## Errors
    ///
    /// - [`HermanoError::ConnectionLost`]: connect failed, the write broke
    ///   mid-stream, or the device hung up before a full status frame
    /// - [`HermanoError::StatusTimeout`]: no status frame within the bound
    /// - [`HermanoError::Device`]: the printer reported a fault
    pub fn submit(
        mut self,
        job: PrintJob,
        device_addr: &str,
    ) -> Result<Completion, HermanoError> {
        tracing::info!(
            device = device_addr,
            framed_bytes = job.as_bytes().len(),
            mode = ?job.print_mode(),
            cut = ?job.cut_mode(),
            media_mm = job.media().mm(),
            "Submitting print job"
        );

        self.transition(SessionState::Connecting);
        let mut transport = match TcpTransport::connect(device_addr, self.connect_timeout) {
            Ok(t) => t,
            Err(e) => {
                // Never connected: no socket to close.
                tracing::warn!(device = device_addr, error = %e, "Connect failed");
                self.transition(SessionState::Failed);
                self.transition(SessionState::Closed);
                return Err(e);
            }
        };

        let result = self.drive(&mut transport, &job);

        match &result {
            Ok(completion) => {
                self.transition(SessionState::Completed);
                tracing::info!(
                    device = device_addr,
                    media_remaining = ?completion.media_remaining,
                    "Print job completed"
                );
            }
            Err(e) => {
                self.transition(SessionState::Failed);
                tracing::warn!(device = device_addr, error = %e, "Print job failed");
            }
        }

        // Both arms above fall through to this close; no early returns
        // once the socket exists.
        transport.close();
        self.transition(SessionState::Closed);
        result
    }

    fn drive(
        &mut self,
        transport: &mut TcpTransport,
        job: &PrintJob,
    ) -> Result<Completion, HermanoError> {
        self.transition(SessionState::Sending);
        transport.send(job.as_bytes())?;

        self.transition(SessionState::AwaitingStatus);
        let frame = transport.read_status_frame(self.status_timeout)?;
        let status = StatusResponse::parse(&frame)?.into_result()?;

        Ok(Completion {
            media_remaining: status.media_remaining,
        })
    }
}

// ============================================================================
// PER-DEVICE SERIALIZATION
// ============================================================================

static DEVICE_LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();

/// The serialization lock for one device address.
///
/// Process-wide: every [`print`] and [`query_status`] against the same
/// `host:port` contends on the same lock. A poisoned lock is taken over
/// rather than propagated — a panicking session holds no device state worth
/// protecting, the socket is already gone.
fn device_lock(device_addr: &str) -> Arc<Mutex<()>> {
    let registry = DEVICE_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = registry.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(device_addr.to_string()).or_default().clone()
}

/// Print a job, serialized per device.
///
/// Holds the device's lock for the lifetime of the underlying
/// [`PrintSession::submit`], so two callers aiming at one printer take
/// turns instead of interleaving job bytes.
pub fn print(job: PrintJob, device_addr: &str) -> Result<Completion, HermanoError> {
    let lock = device_lock(device_addr);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    PrintSession::new().submit(job, device_addr)
}

/// Query device health without printing.
///
/// Opens a short-lived connection, sends a status request, reads the same
/// 8-byte frame a print job would get. A device fault is *data* here, not
/// an error — the caller asked how the printer is doing and "cover open"
/// is the answer.
pub fn query_status(device_addr: &str) -> Result<DeviceStatus, HermanoError> {
    let lock = device_lock(device_addr);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    let mut transport = TcpTransport::connect(device_addr, CONNECT_TIMEOUT)?;
    let result = (|| {
        transport.send(&commands::status_request())?;
        let frame = transport.read_status_frame(STATUS_TIMEOUT)?;
        Ok(DeviceStatus::from(StatusResponse::parse(&frame)?))
    })();
    transport.close();

    if let Ok(status) = &result {
        tracing::info!(
            device = device_addr,
            fault = ?status.fault,
            media_remaining = ?status.media_remaining,
            "Device status"
        );
    }
    result
}
