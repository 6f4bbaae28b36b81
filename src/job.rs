//! # Job Encoder
//!
//! Packages a corrected [`ImageBuffer`] into the device's framed command
//! stream: JPEG payload, job header, chunked data blocks, cut terminator.
//!
//! The encoder never touches the network. Its output, a [`PrintJob`], is a
//! self-contained byte sequence plus metadata — which is what makes the
//! framing unit-testable against golden fixtures without a printer on the
//! bench.
//!
//! ## Fixed JPEG Quality
//!
//! The device decodes JPEG in firmware and chokes on some encoder settings
//! (progressive scans, exotic subsampling). Quality is pinned at a value
//! known to decode on-device and is deliberately not configurable.

use serde::{Deserialize, Serialize};

use crate::color::ImageBuffer;
use crate::error::HermanoError;
use crate::protocol::commands::{self, BLOCK_SIZE};

/// JPEG quality for the device payload. Not user-configurable.
pub const JPEG_QUALITY: u8 = 90;

/// Largest compressed payload the device accepts.
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Longest label, in dots, the device will feed (313 dpi, ~33 cm).
pub const MAX_HEIGHT_DOTS: u32 = 4096;

/// Print mode: the device's two firmware print tables.
///
/// Vivid drives the head slower at a higher line density for saturated
/// color; normal is faster and lighter. The (speed, lpi) pairs are fixed by
/// firmware and never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    Vivid,
    Normal,
}

impl PrintMode {
    /// Mode byte for the job header.
    #[inline]
    pub fn byte(self) -> u8 {
        match self {
            Self::Vivid => 0x00,
            Self::Normal => 0x01,
        }
    }

    /// Head speed byte paired with this mode.
    #[inline]
    pub fn speed(self) -> u8 {
        match self {
            Self::Vivid => 0,
            Self::Normal => 1,
        }
    }

    /// Lines per inch paired with this mode.
    #[inline]
    pub fn lpi(self) -> u16 {
        match self {
            Self::Vivid => 317,
            Self::Normal => 264,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Vivid),
            0x01 => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Post-print media cutting behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Leave the label on the roll
    None,
    /// Half cut: user slides to tear
    Half,
    /// Full cut: label drops free
    Full,
}

impl CutMode {
    /// Cut byte for the job header and finish frame.
    #[inline]
    pub fn byte(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Half => 0x01,
            Self::Full => 0x02,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Half),
            0x02 => Some(Self::Full),
            _ => None,
        }
    }
}

/// Cassette width classes the VC-500W loads, with their printable widths
/// at 313 dpi.
///
/// | Class | Cassette | Printable dots |
/// |-------|----------|----------------|
/// | 0x00 | 9 mm | 96 |
/// | 0x01 | 12 mm | 132 |
/// | 0x02 | 19 mm | 216 |
/// | 0x03 | 25 mm | 296 |
/// | 0x04 | 50 mm | 566 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaWidth {
    #[serde(rename = "9mm")]
    W9,
    #[serde(rename = "12mm")]
    W12,
    #[serde(rename = "19mm")]
    W19,
    #[serde(rename = "25mm")]
    W25,
    #[serde(rename = "50mm")]
    W50,
}

impl MediaWidth {
    /// Media class byte for the job header.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Self::W9 => 0x00,
            Self::W12 => 0x01,
            Self::W19 => 0x02,
            Self::W25 => 0x03,
            Self::W50 => 0x04,
        }
    }

    /// Cassette width in millimeters.
    #[inline]
    pub fn mm(self) -> u8 {
        match self {
            Self::W9 => 9,
            Self::W12 => 12,
            Self::W19 => 19,
            Self::W25 => 25,
            Self::W50 => 50,
        }
    }

    /// Printable width in dots at 313 dpi.
    #[inline]
    pub fn width_dots(self) -> u32 {
        match self {
            Self::W9 => 96,
            Self::W12 => 132,
            Self::W19 => 216,
            Self::W25 => 296,
            Self::W50 => 566,
        }
    }

    /// The narrowest cassette class that fits an image width, or `None`
    /// when the image is wider than the 50 mm cassette prints.
    pub fn for_image_width(width: u32) -> Option<Self> {
        [Self::W9, Self::W12, Self::W19, Self::W25, Self::W50]
            .into_iter()
            .find(|m| width <= m.width_dots())
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::W9),
            0x01 => Some(Self::W12),
            0x02 => Some(Self::W19),
            0x03 => Some(Self::W25),
            0x04 => Some(Self::W50),
            _ => None,
        }
    }
}

/// An encoded print job: the framed byte stream plus its metadata.
///
/// Created by [`encode`], consumed exactly once by a print session, then
/// discarded. The stream is complete — a session writes it verbatim and
/// nothing else.
#[derive(Debug, Clone)]
pub struct PrintJob {
    bytes: Vec<u8>,
    print_mode: PrintMode,
    cut_mode: CutMode,
    media: MediaWidth,
    payload_len: u32,
}

impl PrintJob {
    /// The full framed stream, ready for the wire.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn print_mode(&self) -> PrintMode {
        self.print_mode
    }

    #[inline]
    pub fn cut_mode(&self) -> CutMode {
        self.cut_mode
    }

    /// Media width class the job was encoded for.
    #[inline]
    pub fn media(&self) -> MediaWidth {
        self.media
    }

    /// Compressed payload size in bytes (excludes framing).
    #[inline]
    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }
}

/// Encode a corrected image into a [`PrintJob`].
///
/// Re-encodes the pixels as JPEG at [`JPEG_QUALITY`], picks the narrowest
/// media class that fits, and frames the payload:
///
/// ```text
/// preamble · job header · data block × N · finish
/// ```
///
/// ## Errors
///
/// [`HermanoError::Encoding`] when the image is taller than
/// [`MAX_HEIGHT_DOTS`], wider than the 50 mm cassette prints, or the
/// compressed payload exceeds [`MAX_PAYLOAD_BYTES`].
pub fn encode(
    image: ImageBuffer,
    print_mode: PrintMode,
    cut_mode: CutMode,
) -> Result<PrintJob, HermanoError> {
    if image.height() > MAX_HEIGHT_DOTS {
        return Err(HermanoError::Encoding(format!(
            "image height {} exceeds the {} dot feed limit",
            image.height(),
            MAX_HEIGHT_DOTS
        )));
    }
    let media = MediaWidth::for_image_width(image.width()).ok_or_else(|| {
        HermanoError::Encoding(format!(
            "image width {} exceeds the 50mm cassette ({} dots)",
            image.width(),
            MediaWidth::W50.width_dots()
        ))
    })?;

    let payload = encode_jpeg(&image)?;
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(HermanoError::Encoding(format!(
            "compressed payload is {} bytes, device limit is {}",
            payload.len(),
            MAX_PAYLOAD_BYTES
        )));
    }

    let bytes = frame_payload(&payload, print_mode, cut_mode, media);
    tracing::debug!(
        payload = payload.len(),
        framed = bytes.len(),
        media_mm = media.mm(),
        "Encoded print job"
    );

    Ok(PrintJob {
        bytes,
        print_mode,
        cut_mode,
        media,
        payload_len: payload.len() as u32,
    })
}

/// JPEG-compress the buffer at the device's pinned quality.
fn encode_jpeg(image: &ImageBuffer) -> Result<Vec<u8>, HermanoError> {
    use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| HermanoError::Encoding(format!("JPEG encoding failed: {}", e)))?;
    Ok(out)
}

/// Assemble the framed stream around an already-compressed payload.
///
/// Split out from [`encode`] so golden tests can pin exact frame bytes
/// with a synthetic payload, independent of JPEG encoder output.
pub fn frame_payload(
    payload: &[u8],
    print_mode: PrintMode,
    cut_mode: CutMode,
    media: MediaWidth,
) -> Vec<u8> {
    // preamble (2) + header (12) + per-block overhead (4) + finish (3)
    let blocks = payload.len().div_ceil(BLOCK_SIZE);
    let mut bytes = Vec::with_capacity(17 + payload.len() + blocks * 4);

    bytes.extend(commands::preamble());
    bytes.extend(commands::job_header(
        print_mode.byte(),
        print_mode.speed(),
        print_mode.lpi(),
        cut_mode.byte(),
        media.code(),
        payload.len() as u32,
    ));
    for chunk in payload.chunks(BLOCK_SIZE) {
        bytes.extend(commands::data_block(chunk));
    }
    bytes.extend(commands::finish(cut_mode.byte()));
    bytes
}

/// A job frame decoded back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedJob {
    /// The compressed image payload, reassembled from the data blocks.
    pub payload: Vec<u8>,
    pub print_mode: PrintMode,
    pub cut_mode: CutMode,
    pub media: MediaWidth,
}

/// Decode a framed job stream back into payload and parameters.
///
/// Validation hook for golden fixtures and the framing round-trip tests;
/// also what the scripted fake device in the session tests uses to know
/// when a full job has arrived. Strict: every structural inconsistency —
/// bad prefixes, a speed or LPI that contradicts the mode byte, payload
/// length mismatch, a finish cut that contradicts the header — is an
/// [`HermanoError::Encoding`].
pub fn decode_job_frame(bytes: &[u8]) -> Result<DecodedJob, HermanoError> {
    fn err(msg: impl Into<String>) -> HermanoError {
        HermanoError::Encoding(msg.into())
    }

    let rest = bytes
        .strip_prefix(&[commands::ESC, b'@'][..])
        .ok_or_else(|| err("missing preamble"))?;

    let header = rest.get(..12).ok_or_else(|| err("truncated job header"))?;
    if header[0] != commands::GS || header[1] != b'J' {
        return Err(err("bad job header prefix"));
    }
    let print_mode =
        PrintMode::from_byte(header[2]).ok_or_else(|| err("unknown print mode byte"))?;
    let lpi = u16::from_le_bytes([header[4], header[5]]);
    if header[3] != print_mode.speed() || lpi != print_mode.lpi() {
        return Err(err("speed/lpi bytes contradict print mode"));
    }
    let cut_mode = CutMode::from_byte(header[6]).ok_or_else(|| err("unknown cut mode byte"))?;
    let media = MediaWidth::from_code(header[7]).ok_or_else(|| err("unknown media class byte"))?;
    let payload_len =
        u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;

    let mut rest = &rest[12..];
    // Cap the pre-allocation; the declared length is untrusted input here.
    let mut payload = Vec::with_capacity(payload_len.min(MAX_PAYLOAD_BYTES));
    while rest.first() == Some(&commands::GS) && rest.get(1) == Some(&b'D') {
        let len_bytes = rest.get(2..4).ok_or_else(|| err("truncated data block"))?;
        let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if len == 0 || len > BLOCK_SIZE {
            return Err(err("data block length out of range"));
        }
        let chunk = rest
            .get(4..4 + len)
            .ok_or_else(|| err("data block shorter than its length field"))?;
        payload.extend_from_slice(chunk);
        rest = &rest[4 + len..];
    }

    if payload.len() != payload_len {
        return Err(err(format!(
            "payload is {} bytes, header declared {}",
            payload.len(),
            payload_len
        )));
    }

    let finish = rest.get(..3).ok_or_else(|| err("missing finish frame"))?;
    if finish[0] != commands::GS || finish[1] != b'F' {
        return Err(err("bad finish frame prefix"));
    }
    if finish[2] != cut_mode.byte() {
        return Err(err("finish cut byte contradicts job header"));
    }
    if rest.len() != 3 {
        return Err(err("trailing bytes after finish frame"));
    }

    Ok(DecodedJob {
        payload,
        print_mode,
        cut_mode,
        media,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tiny_image() -> ImageBuffer {
        ImageBuffer::new(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap()
    }

    #[test]
    fn test_mode_tables() {
        assert_eq!(PrintMode::Vivid.speed(), 0);
        assert_eq!(PrintMode::Vivid.lpi(), 317);
        assert_eq!(PrintMode::Normal.speed(), 1);
        assert_eq!(PrintMode::Normal.lpi(), 264);
    }

    #[test]
    fn test_media_selection_is_narrowest_fit() {
        assert_eq!(MediaWidth::for_image_width(1), Some(MediaWidth::W9));
        assert_eq!(MediaWidth::for_image_width(96), Some(MediaWidth::W9));
        assert_eq!(MediaWidth::for_image_width(97), Some(MediaWidth::W12));
        assert_eq!(MediaWidth::for_image_width(296), Some(MediaWidth::W25));
        assert_eq!(MediaWidth::for_image_width(566), Some(MediaWidth::W50));
        assert_eq!(MediaWidth::for_image_width(567), None);
    }

    #[test]
    fn test_encode_produces_wellformed_frame() {
        let job = encode(tiny_image(), PrintMode::Vivid, CutMode::Full).unwrap();
        let decoded = decode_job_frame(job.as_bytes()).unwrap();
        assert_eq!(decoded.print_mode, PrintMode::Vivid);
        assert_eq!(decoded.cut_mode, CutMode::Full);
        assert_eq!(decoded.media, MediaWidth::W9);
        assert_eq!(decoded.payload.len() as u32, job.payload_len());
        // Payload must be a decodable JPEG of the original dimensions.
        let img = image::load_from_memory(&decoded.payload).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
    }

    #[test]
    fn test_encode_rejects_overwide_image() {
        let wide = ImageBuffer::new(600, 1, vec![0; 600 * 3]).unwrap();
        assert!(matches!(
            encode(wide, PrintMode::Vivid, CutMode::Full),
            Err(HermanoError::Encoding(_))
        ));
    }

    #[test]
    fn test_encode_rejects_overlong_image() {
        let tall = ImageBuffer::new(1, MAX_HEIGHT_DOTS + 1, vec![0; (MAX_HEIGHT_DOTS as usize + 1) * 3])
            .unwrap();
        assert!(matches!(
            encode(tall, PrintMode::Vivid, CutMode::Full),
            Err(HermanoError::Encoding(_))
        ));
    }

    #[test]
    fn test_frame_chunking_at_block_boundary() {
        // Exactly one full block
        let payload = vec![0x55; BLOCK_SIZE];
        let frame = frame_payload(&payload, PrintMode::Normal, CutMode::None, MediaWidth::W19);
        let decoded = decode_job_frame(&frame).unwrap();
        assert_eq!(decoded.payload, payload);

        // One byte over: two blocks
        let payload = vec![0x55; BLOCK_SIZE + 1];
        let frame = frame_payload(&payload, PrintMode::Normal, CutMode::None, MediaWidth::W19);
        // preamble 2 + header 12 + (4 + 4096) + (4 + 1) + finish 3
        assert_eq!(frame.len(), 2 + 12 + 4 + BLOCK_SIZE + 4 + 1 + 3);
        let decoded = decode_job_frame(&frame).unwrap();
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn test_decode_rejects_tampered_frames() {
        let frame = frame_payload(&[0xAA; 10], PrintMode::Vivid, CutMode::Half, MediaWidth::W9);

        // Flip the finish cut byte
        let mut bad = frame.clone();
        let n = bad.len();
        bad[n - 1] = CutMode::Full.byte();
        assert!(decode_job_frame(&bad).is_err());

        // Contradict the mode's lpi
        let mut bad = frame.clone();
        bad[6] = 0xFF;
        assert!(decode_job_frame(&bad).is_err());

        // Truncate mid-block
        assert!(decode_job_frame(&frame[..frame.len() - 5]).is_err());
    }
}
