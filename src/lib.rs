//! # Hermano - VC-500W Label Printer Library
//!
//! Hermano is a Rust library for color-correcting images and printing them
//! on Brother VC-500W label printers over TCP/IP. It provides:
//!
//! - **Color engine**: a deterministic CMYK/exposure/black-level/contrast
//!   pipeline whose preview and print output are byte-identical
//! - **Paper profiles**: baseline adjustments for standard and ZINK media
//! - **Job encoder**: JPEG payload framing into the device command stream
//! - **Print session**: one-job TCP sessions with bounded timeouts and
//!   status/fault mapping
//!
//! ## Quick Start
//!
//! ```no_run
//! use hermano::{
//!     color::AdjustmentSet,
//!     job::{CutMode, PrintMode},
//! };
//!
//! // Image bytes in any common format; sliders straight from the UI.
//! let image_bytes = std::fs::read("label.png")?;
//! let sliders = AdjustmentSet { exposure: 15, cyan: -10, ..Default::default() };
//!
//! // Correct on the ZINK baseline and frame for the device...
//! let job = hermano::correct_and_encode(
//!     &image_bytes,
//!     &sliders,
//!     "zink",
//!     PrintMode::Vivid,
//!     CutMode::Full,
//! )?;
//!
//! // ...then print. One session, one connection, closed either way.
//! let done = hermano::print(job, "192.168.0.50:9100")?;
//! if let Some(pct) = done.media_remaining {
//!     println!("{}% of the cassette left", pct);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`color`] | Pixel buffers, adjustment sets, the correction engine, paper profiles |
//! | [`job`] | Print/cut/media types and the job encoder |
//! | [`protocol`] | Device command builders and status frame parsing |
//! | [`transport`] | Raw TCP transport |
//! | [`session`] | The print session state machine and per-device locking |
//! | [`error`] | Error types |
//!
//! ## Scope
//!
//! The HTTP bridge, UI, upload handling, and CLI around this library are
//! separate concerns; hermano begins at decoded parameters and ends at a
//! device outcome. There is no job queue and no connection pooling — the
//! VC-500W protocol is strictly one open → send → status → close sequence
//! per job.

pub mod color;
pub mod error;
pub mod job;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use color::{AdjustmentSet, ImageBuffer};
pub use error::{DeviceFault, HermanoError};
pub use job::{CutMode, PrintJob, PrintMode};
pub use session::{Completion, PrintSession, print, query_status};

/// Correct an image and encode it as a print job in one step.
///
/// The composition the bridge endpoint calls: decode the upload, resolve
/// the paper profile, stack the user's sliders on the profile baseline, run
/// the color engine, frame the result.
///
/// ## Errors
///
/// Fails fast with the first stage's error — [`HermanoError::InvalidImage`]
/// for undecodable bytes, [`HermanoError::UnknownProfile`] for a bad
/// profile name, [`HermanoError::Encoding`] for device-limit violations. No
/// partial job is ever returned.
pub fn correct_and_encode(
    image_bytes: &[u8],
    adjustments: &AdjustmentSet,
    paper_profile: &str,
    print_mode: PrintMode,
    cut_mode: CutMode,
) -> Result<PrintJob, HermanoError> {
    let baseline = color::profile::resolve(paper_profile)?;
    let combined = baseline.stack(adjustments);

    let buffer = ImageBuffer::decode(image_bytes)?;
    let corrected = color::engine::apply(buffer, combined)?;
    job::encode(corrected, print_mode, cut_mode)
}
