//! # Device Status Frame
//!
//! After a print job (or a standalone status request) the VC-500W answers
//! with one fixed-format 8-byte frame. This module parses it and maps the
//! fault byte to [`DeviceFault`] subkinds.
//!
//! ## Frame Layout
//!
//! | Offset | Field | Values |
//! |--------|-------|--------|
//! | 0 | STX | 0x02 |
//! | 1 | frame tag | 'S' (0x53) |
//! | 2 | state | 0x00 accepted, 0x01 fault |
//! | 3 | fault code | see table below, 0x00 when state is accepted |
//! | 4 | media remaining | 0-100 percent, 0xFF not reported |
//! | 5-6 | reserved | 0x00 |
//! | 7 | ETX | 0x03 |
//!
//! ## Fault Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0x01 | cassette empty / missing |
//! | 0x02 | cassette cover open |
//! | 0x03 | cassette width does not match the job's media class |
//! | other nonzero | generic fault |
//!
//! Like the command table, this mapping is reverse-engineered and must only
//! be changed against captured device responses, never from guesswork.

use crate::error::{DeviceFault, HermanoError};

/// Length of the status frame in bytes.
pub const STATUS_FRAME_LEN: usize = 8;

/// STX framing byte.
pub const STX: u8 = 0x02;

/// ETX framing byte.
pub const ETX: u8 = 0x03;

/// Tag byte identifying a status frame.
pub const STATUS_TAG: u8 = b'S';

/// A parsed status/acknowledgement frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponse {
    /// Whether the device accepted the job (state byte 0x00).
    pub accepted: bool,
    /// Fault subkind when the device reported one.
    pub fault: Option<DeviceFault>,
    /// Remaining media percentage, when the device reports it.
    ///
    /// Auxiliary info, never an error — a successful print with 3% media
    /// left is still a successful print.
    pub media_remaining: Option<u8>,
}

impl StatusResponse {
    /// Parse one 8-byte status frame.
    ///
    /// A frame that fails structural validation (wrong length, bad STX/ETX,
    /// wrong tag) means the byte stream itself broke — the device never
    /// sends anything else on this socket — so it maps to
    /// [`HermanoError::ConnectionLost`], not to a device fault.
    pub fn parse(frame: &[u8]) -> Result<Self, HermanoError> {
        if frame.len() != STATUS_FRAME_LEN {
            return Err(HermanoError::ConnectionLost(format!(
                "status frame is {} bytes, expected {}",
                frame.len(),
                STATUS_FRAME_LEN
            )));
        }
        if frame[0] != STX || frame[7] != ETX || frame[1] != STATUS_TAG {
            return Err(HermanoError::ConnectionLost(format!(
                "malformed status frame: {:02X?}",
                frame
            )));
        }

        let accepted = frame[2] == 0x00;
        let fault = if accepted {
            None
        } else {
            Some(fault_from_code(frame[3]))
        };
        let media_remaining = match frame[4] {
            0xFF => None,
            pct => Some(pct.min(100)),
        };

        Ok(Self {
            accepted,
            fault,
            media_remaining,
        })
    }

    /// Fold the frame into a `Result`: accepted frames pass through, fault
    /// frames become [`HermanoError::Device`].
    pub fn into_result(self) -> Result<Self, HermanoError> {
        match self.fault {
            None => Ok(self),
            Some(fault) => Err(HermanoError::Device(fault)),
        }
    }
}

/// Map a status frame fault code to its subkind.
fn fault_from_code(code: u8) -> DeviceFault {
    match code {
        0x01 => DeviceFault::NoMedia,
        0x02 => DeviceFault::CoverOpen,
        0x03 => DeviceFault::MediaMismatch,
        _ => DeviceFault::Fault,
    }
}

/// Snapshot of device health, returned by a standalone status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Current fault, if the device is in one.
    pub fault: Option<DeviceFault>,
    /// Remaining media percentage, when reported.
    pub media_remaining: Option<u8>,
}

impl From<StatusResponse> for DeviceStatus {
    fn from(response: StatusResponse) -> Self {
        Self {
            fault: response.fault,
            media_remaining: response.media_remaining,
        }
    }
}

/// Build a status frame. Test/fixture helper — the library only ever
/// parses these, the device builds them.
pub fn build_frame(state: u8, fault_code: u8, media: u8) -> [u8; STATUS_FRAME_LEN] {
    [STX, STATUS_TAG, state, fault_code, media, 0x00, 0x00, ETX]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepted_with_media() {
        let frame = build_frame(0x00, 0x00, 72);
        let status = StatusResponse::parse(&frame).unwrap();
        assert!(status.accepted);
        assert_eq!(status.fault, None);
        assert_eq!(status.media_remaining, Some(72));
    }

    #[test]
    fn test_parse_accepted_media_not_reported() {
        let frame = build_frame(0x00, 0x00, 0xFF);
        let status = StatusResponse::parse(&frame).unwrap();
        assert_eq!(status.media_remaining, None);
    }

    #[test]
    fn test_parse_media_clamped_to_100() {
        let frame = build_frame(0x00, 0x00, 140);
        let status = StatusResponse::parse(&frame).unwrap();
        assert_eq!(status.media_remaining, Some(100));
    }

    #[test]
    fn test_fault_code_mapping() {
        for (code, expected) in [
            (0x01, DeviceFault::NoMedia),
            (0x02, DeviceFault::CoverOpen),
            (0x03, DeviceFault::MediaMismatch),
            (0x04, DeviceFault::Fault),
            (0xEE, DeviceFault::Fault),
        ] {
            let frame = build_frame(0x01, code, 0xFF);
            let status = StatusResponse::parse(&frame).unwrap();
            assert_eq!(status.fault, Some(expected));
        }
    }

    #[test]
    fn test_fault_frame_folds_to_error() {
        let frame = build_frame(0x01, 0x02, 0xFF);
        let err = StatusResponse::parse(&frame).unwrap().into_result().unwrap_err();
        assert!(matches!(err, HermanoError::Device(DeviceFault::CoverOpen)));
    }

    #[test]
    fn test_accepted_frame_folds_to_ok() {
        let frame = build_frame(0x00, 0x00, 10);
        assert!(StatusResponse::parse(&frame).unwrap().into_result().is_ok());
    }

    #[test]
    fn test_malformed_frames_are_connection_loss() {
        // wrong length
        assert!(matches!(
            StatusResponse::parse(&[0x02, b'S', 0x00]),
            Err(HermanoError::ConnectionLost(_))
        ));
        // bad STX
        let mut frame = build_frame(0x00, 0x00, 0xFF);
        frame[0] = 0x00;
        assert!(matches!(
            StatusResponse::parse(&frame),
            Err(HermanoError::ConnectionLost(_))
        ));
        // bad tag
        let mut frame = build_frame(0x00, 0x00, 0xFF);
        frame[1] = b'X';
        assert!(matches!(
            StatusResponse::parse(&frame),
            Err(HermanoError::ConnectionLost(_))
        ));
    }

    #[test]
    fn test_device_status_from_response() {
        let frame = build_frame(0x01, 0x01, 0x00);
        let status: DeviceStatus = StatusResponse::parse(&frame).unwrap().into();
        assert_eq!(status.fault, Some(DeviceFault::NoMedia));
        assert_eq!(status.media_remaining, Some(0));
    }
}
