//! # VC-500W Wire Protocol
//!
//! Low-level builders and parsers for the byte stream a Brother VC-500W
//! accepts on its raw print port (TCP 9100).
//!
//! ## Module Structure
//!
//! - [`commands`]: Command frame builders (preamble, job header, data
//!   blocks, finish/cut, status request) and the byte constant table
//! - [`status`]: The fixed-format status/acknowledgement frame the device
//!   returns after a job
//!
//! ## Stream Shape
//!
//! One print job on the wire is:
//!
//! ```text
//! preamble · job header · data block × N · finish
//! ```
//!
//! followed by a single 8-byte status frame read back from the device.
//! There is no further handshake, negotiation, or session resumption.
//!
//! ## A Word on the Constant Table
//!
//! The exact byte layout is reverse-engineered, not vendor-documented. It
//! lives in [`commands`] as one table of constants so that golden frames
//! captured from known-good jobs can be diffed against builder output
//! without touching any call site. Do not "fix" field offsets from memory —
//! change them only against captured fixtures.

pub mod commands;
pub mod status;

pub use status::{DeviceStatus, StatusResponse};
