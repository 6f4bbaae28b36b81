//! Owned RGB pixel buffers.

use crate::error::HermanoError;

/// An owned, row-major RGB8 pixel buffer.
///
/// The buffer moves through the pipeline by value — decode hands it to the
/// color engine, the engine hands a corrected buffer to the job encoder.
/// Nothing aliases it, so every stage is free to mutate in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    /// Packed RGB triples, `3 * width * height` bytes.
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Build a buffer from raw RGB bytes.
    ///
    /// Fails with [`HermanoError::InvalidImage`] on zero dimensions or a
    /// length mismatch.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HermanoError> {
        if width == 0 || height == 0 {
            return Err(HermanoError::InvalidImage(format!(
                "zero-dimension image ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(HermanoError::InvalidImage(format!(
                "pixel data is {} bytes, expected {} for {}x{} RGB",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Decode any image format the `image` crate understands (JPEG, PNG,
    /// WebP, ...) into an RGB buffer. Alpha is dropped.
    pub fn decode(bytes: &[u8]) -> Result<Self, HermanoError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| HermanoError::InvalidImage(format!("decode failed: {}", e)))?;
        let rgb = decoded.to_rgb8();
        Self::new(rgb.width(), rgb.height(), rgb.into_raw())
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The packed RGB bytes, row-major.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access for in-place correction.
    #[inline]
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning the packed RGB bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Read one pixel. Panics if out of bounds (test/debug helper).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let buf = ImageBuffer::new(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.width(), 2);
        assert_eq!(buf.height(), 1);
        assert_eq!(buf.pixel(0, 0), [1, 2, 3]);
        assert_eq!(buf.pixel(1, 0), [4, 5, 6]);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            ImageBuffer::new(0, 10, vec![]),
            Err(HermanoError::InvalidImage(_))
        ));
        assert!(matches!(
            ImageBuffer::new(10, 0, vec![]),
            Err(HermanoError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(matches!(
            ImageBuffer::new(2, 2, vec![0; 11]),
            Err(HermanoError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_garbage_rejected() {
        assert!(matches!(
            ImageBuffer::decode(b"not an image"),
            Err(HermanoError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_png_roundtrip() {
        // Encode a tiny PNG in memory, then decode it back.
        let img = image::RgbImage::from_raw(2, 2, vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 128, 128, 128,
        ])
        .unwrap();
        let mut png = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let buf = ImageBuffer::decode(png.get_ref()).unwrap();
        assert_eq!((buf.width(), buf.height()), (2, 2));
        assert_eq!(buf.pixel(1, 1), [128, 128, 128]);
    }
}
