//! Frame acquisition for the classify path.
//!
//! Camera device handling is an external concern; the app only needs
//! something that yields an RGB frame on demand. [`TestPatternSource`]
//! stands in where no capture device is wired up, so the classify path can
//! be exercised end to end.

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use crate::error::Result;

/// Capture resolution, kept small to bound upload size.
pub const CAPTURE_WIDTH: u32 = 320;
pub const CAPTURE_HEIGHT: u32 = 240;

const JPEG_QUALITY: u8 = 80;

/// Source of still frames for gesture classification.
pub trait FrameSource: Send {
    /// Grab the next frame. A device failure here disables the capture path
    /// for the rest of the session; it is never fatal.
    fn grab(&mut self) -> Result<RgbImage>;
}

/// Procedural frame source: a slowly shifting gradient.
pub struct TestPatternSource {
    frame: u64,
}

impl TestPatternSource {
    pub fn new() -> Self {
        Self { frame: 0 }
    }
}

impl Default for TestPatternSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for TestPatternSource {
    fn grab(&mut self) -> Result<RgbImage> {
        self.frame += 1;
        let t = self.frame as u32;
        Ok(RgbImage::from_fn(CAPTURE_WIDTH, CAPTURE_HEIGHT, |x, y| {
            Rgb([
                (x * 255 / CAPTURE_WIDTH) as u8,
                (y * 255 / CAPTURE_HEIGHT) as u8,
                (t % 256) as u8,
            ])
        }))
    }
}

/// Encode a captured frame to JPEG bytes for the classifier.
pub fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    frame.write_with_encoder(encoder)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_pattern_dimensions() {
        let mut source = TestPatternSource::new();
        let frame = source.grab().unwrap();
        assert_eq!(frame.dimensions(), (CAPTURE_WIDTH, CAPTURE_HEIGHT));
    }

    #[test]
    fn test_frames_change_over_time() {
        let mut source = TestPatternSource::new();
        let a = source.grab().unwrap();
        let b = source.grab().unwrap();
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg_magic() {
        let mut source = TestPatternSource::new();
        let bytes = encode_jpeg(&source.grab().unwrap()).unwrap();
        // SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert!(!bytes.is_empty());
    }
}
