//! # Error Types
//!
//! This module defines error types used throughout the hermano library.

use thiserror::Error;

/// Main error type for hermano operations
#[derive(Debug, Error)]
pub enum HermanoError {
    /// Malformed or zero-dimension input image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Paper profile name is not registered
    #[error("Unknown paper profile: {0}")]
    UnknownProfile(String),

    /// Image exceeds device limits, or JPEG encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Connection dropped while talking to the device
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Device did not answer with a status frame within the bound
    #[error("Timed out waiting for device status")]
    StatusTimeout,

    /// Printer-reported fault
    #[error("Device error: {0}")]
    Device(DeviceFault),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fault subkinds a VC-500W reports in its status frame.
///
/// Retry policy belongs to the caller: `NoMedia` and `CoverOpen` need user
/// intervention before a resend can succeed, while a generic `Fault` may
/// clear on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceFault {
    /// Cassette is empty or missing
    #[error("no media")]
    NoMedia,

    /// Cassette cover is open
    #[error("cover open")]
    CoverOpen,

    /// Inserted cassette does not match the job's media width class
    #[error("media mismatch")]
    MediaMismatch,

    /// Any other printer-reported fault
    #[error("printer fault")]
    Fault,
}
