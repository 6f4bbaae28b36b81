//! # VC-500W Command Builders
//!
//! This module implements the framed command stream the Brother VC-500W
//! label printer accepts on its raw data port.
//!
//! ## Protocol Overview
//!
//! A print job is a fixed sequence of frames:
//!
//! | Frame | Prefix | Purpose |
//! |-------|--------|---------|
//! | Preamble | ESC @ | Reset the job pipeline |
//! | Job header | GS J | Mode, speed, LPI, cut, media class, payload length |
//! | Data block | GS D | One chunk of the JPEG payload (≤ 4096 bytes) |
//! | Finish | GS F | Terminate the job, cut per the requested mode |
//! | Status request | GS S | Standalone status poll (no job) |
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//! - `u32` value 0x12345678 is sent as `[0x78, 0x56, 0x34, 0x12]`
//!
//! ## Provenance
//!
//! These values are a reverse-engineered constant table, validated against
//! byte captures of known-good jobs (see `tests/golden_frames.rs`). They
//! are deliberately kept in this one module: if a hardware capture
//! disagrees, the fix is here and nowhere else.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Preamble prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Frame prefix for job, data, finish, and status
/// frames. Hex: 0x1D, Decimal: 29.
pub const GS: u8 = 0x1D;

/// Maximum payload bytes per data block.
///
/// The device's receive buffer drains in 4 KiB units; larger blocks are
/// rejected mid-stream. The transport also uses this as its write chunk
/// size so one block is one socket write.
pub const BLOCK_SIZE: usize = 4096;

// ============================================================================
// JOB FRAMES
// ============================================================================

/// # Job Preamble (ESC @)
///
/// Resets the device's job pipeline. Sent exactly once, before the job
/// header. A device that receives a header without a preamble keeps
/// whatever half-parsed state the previous (possibly aborted) job left.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
#[inline]
pub fn preamble() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Job Header (GS J ...)
///
/// Declares every parameter the device needs before payload bytes arrive.
///
/// ## Layout (12 bytes)
///
/// | Offset | Field | Encoding |
/// |--------|-------|----------|
/// | 0-1 | prefix | GS J (1D 4A) |
/// | 2 | print mode | 0x00 vivid, 0x01 normal |
/// | 3 | head speed | 0 (vivid) or 1 (normal) |
/// | 4-5 | lines per inch | u16 LE: 317 vivid, 264 normal |
/// | 6 | cut mode | 0x00 none, 0x01 half, 0x02 full |
/// | 7 | media class | cassette width code, see `job::MediaWidth` |
/// | 8-11 | payload length | u32 LE, total JPEG bytes across all blocks |
///
/// The mode/speed/LPI triple mirrors the device's two firmware print
/// tables; the pairs are fixed, never mixed.
#[inline]
pub fn job_header(
    mode: u8,
    speed: u8,
    lpi: u16,
    cut: u8,
    media: u8,
    payload_len: u32,
) -> Vec<u8> {
    let lpi = u16_le(lpi);
    let len = u32_le(payload_len);
    vec![
        GS, b'J', mode, speed, lpi[0], lpi[1], cut, media, len[0], len[1], len[2], len[3],
    ]
}

/// # Data Block (GS D n1 n2 d1...dk)
///
/// One chunk of the JPEG payload.
///
/// | Offset | Field | Encoding |
/// |--------|-------|----------|
/// | 0-1 | prefix | GS D (1D 44) |
/// | 2-3 | chunk length | u16 LE, 1..=4096 |
/// | 4.. | payload bytes | raw JPEG data |
///
/// ## Panics
///
/// Debug-asserts the chunk fits [`BLOCK_SIZE`]; the job encoder is the only
/// caller and always chunks first.
#[inline]
pub fn data_block(chunk: &[u8]) -> Vec<u8> {
    debug_assert!(!chunk.is_empty() && chunk.len() <= BLOCK_SIZE);
    let len = u16_le(chunk.len() as u16);
    let mut frame = Vec::with_capacity(4 + chunk.len());
    frame.extend_from_slice(&[GS, b'D', len[0], len[1]]);
    frame.extend_from_slice(chunk);
    frame
}

/// # Finish / Cut (GS F n)
///
/// Terminates the job. The device prints whatever payload it has buffered,
/// then handles the media per the cut byte:
///
/// | n | Behavior |
/// |---|----------|
/// | 0x00 | no cut, label stays on the roll |
/// | 0x01 | half cut, user slides to tear |
/// | 0x02 | full cut, label drops free |
///
/// The cut byte here must match byte 6 of the job header; the device
/// treats a mismatch as a malformed job.
#[inline]
pub fn finish(cut: u8) -> Vec<u8> {
    vec![GS, b'F', cut]
}

/// # Status Request (GS S)
///
/// Standalone poll: the device answers with the same 8-byte status frame
/// it sends after a print job, without printing anything. Used by the
/// bridge's printer-status endpoint.
#[inline]
pub fn status_request() -> Vec<u8> {
    vec![GS, b'S']
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high].
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

/// Encode a u32 value as little-endian bytes, lowest first.
#[inline]
pub const fn u32_le(value: u32) -> [u8; 4] {
    [
        value as u8,
        (value >> 8) as u8,
        (value >> 16) as u8,
        (value >> 24) as u8,
    ]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble() {
        assert_eq!(preamble(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_job_header_layout() {
        // vivid, speed 0, 317 lpi, full cut, media class 2, 0x01020304 bytes
        let header = job_header(0x00, 0x00, 317, 0x02, 0x02, 0x0102_0304);
        assert_eq!(
            header,
            vec![0x1D, 0x4A, 0x00, 0x00, 0x3D, 0x01, 0x02, 0x02, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(header.len(), 12);
    }

    #[test]
    fn test_data_block_small() {
        let block = data_block(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(block, vec![0x1D, 0x44, 0x03, 0x00, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_data_block_max() {
        let chunk = vec![0x7F; BLOCK_SIZE];
        let block = data_block(&chunk);
        // 4096 = 0x1000 → LE [0x00, 0x10]
        assert_eq!(&block[..4], &[0x1D, 0x44, 0x00, 0x10]);
        assert_eq!(block.len(), 4 + BLOCK_SIZE);
    }

    #[test]
    fn test_finish() {
        assert_eq!(finish(0x00), vec![0x1D, 0x46, 0x00]);
        assert_eq!(finish(0x01), vec![0x1D, 0x46, 0x01]);
        assert_eq!(finish(0x02), vec![0x1D, 0x46, 0x02]);
    }

    #[test]
    fn test_status_request() {
        assert_eq!(status_request(), vec![0x1D, 0x53]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x0000), [0x00, 0x00]);
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(317), [0x3D, 0x01]);
        assert_eq!(u16_le(264), [0x08, 0x01]);
    }

    #[test]
    fn test_u32_le() {
        assert_eq!(u32_le(0), [0x00; 4]);
        assert_eq!(u32_le(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32_le(4096), [0x00, 0x10, 0x00, 0x00]);
    }
}
