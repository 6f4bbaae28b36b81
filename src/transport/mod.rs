//! # Printer Transport Layer
//!
//! Communication backend for moving job bytes to the device.
//!
//! ## Available Transports
//!
//! - [`tcp`]: Raw TCP to the device's print port (9100)
//!
//! The VC-500W speaks nothing above raw TCP on that port — no TLS, no HTTP,
//! no IPP. Sessions are strictly one job per connection, so the transport
//! has no pooling or reconnect logic by design.

pub mod tcp;

pub use tcp::TcpTransport;
