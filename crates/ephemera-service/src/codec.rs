//! Upload decoding and JPEG re-encoding.

use ephemera_core::{EphemeraError, EphemeraResult};
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use tracing::debug;

/// Default JPEG quality for re-encoded uploads.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Raw upload as received from a client.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name, used only to pick a decoder.
    pub filename: Option<String>,
    /// Undecoded file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Creates an upload.
    #[must_use]
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self { filename, bytes }
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Turns an arbitrary upload into the stored payload.
pub trait ImageCodec: Send + Sync {
    /// Decode `upload` and re-encode it into the canonical stored format.
    ///
    /// # Errors
    ///
    /// Returns `EphemeraError::Decode` when the upload is not a readable image.
    fn reencode(&self, upload: &ImageUpload) -> EphemeraResult<Vec<u8>>;
}

/// Re-encodes every upload as a baseline JPEG.
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    quality: u8,
}

impl JpegCodec {
    /// Creates a codec encoding at `quality` (clamped to 1..=100).
    #[must_use]
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Configured JPEG quality.
    #[must_use]
    pub const fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

/// Picks a decoder from the file name; `None` means sniff the contents.
fn format_hint(filename: Option<&str>) -> Option<ImageFormat> {
    let name = filename?.to_ascii_lowercase();
    if name.contains(".png") {
        Some(ImageFormat::Png)
    } else if name.contains(".jpg") || name.contains(".jpeg") {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

impl ImageCodec for JpegCodec {
    fn reencode(&self, upload: &ImageUpload) -> EphemeraResult<Vec<u8>> {
        let hint = format_hint(upload.filename.as_deref());

        let decoded = match hint {
            Some(format) => image::load_from_memory_with_format(&upload.bytes, format),
            None => image::load_from_memory(&upload.bytes),
        }
        .map_err(|e| EphemeraError::decode(format!("Unreadable image: {}", e)))?;

        // JPEG has no alpha channel.
        let rgb = decoded.to_rgb8();

        let mut encoded = Vec::new();
        JpegEncoder::new_with_quality(&mut encoded, self.quality)
            .encode_image(&rgb)
            .map_err(|e| EphemeraError::decode(format!("Failed to encode JPEG: {}", e)))?;

        debug!(
            hint = ?hint,
            width = rgb.width(),
            height = rgb.height(),
            input_size = upload.bytes.len(),
            output_size = encoded.len(),
            "Re-encoded upload"
        );
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn png_bytes() -> Vec<u8> {
        encode(
            &DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([200, 10, 10]))),
            ImageFormat::Png,
        )
    }

    #[test]
    fn test_format_hint() {
        assert_eq!(format_hint(Some("cat.png")), Some(ImageFormat::Png));
        assert_eq!(format_hint(Some("CAT.PNG")), Some(ImageFormat::Png));
        assert_eq!(format_hint(Some("cat.jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_hint(Some("cat.jpeg")), Some(ImageFormat::Jpeg));
        assert_eq!(format_hint(Some("cat.gif")), None);
        assert_eq!(format_hint(Some("cat")), None);
        assert_eq!(format_hint(None), None);
    }

    #[test]
    fn test_png_is_reencoded_as_jpeg() {
        let upload = ImageUpload::new(Some("photo.png".to_string()), png_bytes());

        let out = JpegCodec::default().reencode(&upload).unwrap();

        assert_eq!(out[..2], JPEG_MAGIC);
        let decoded = image::load_from_memory_with_format(&out, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_unknown_name_sniffs_contents() {
        let upload = ImageUpload::new(Some("upload.bin".to_string()), png_bytes());
        assert_eq!(JpegCodec::default().reencode(&upload).unwrap()[..2], JPEG_MAGIC);

        let upload = ImageUpload::new(None, png_bytes());
        assert_eq!(JpegCodec::default().reencode(&upload).unwrap()[..2], JPEG_MAGIC);
    }

    #[test]
    fn test_alpha_channel_is_dropped() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 128])));
        let upload = ImageUpload::new(Some("a.png".to_string()), encode(&rgba, ImageFormat::Png));

        let out = JpegCodec::new(90).reencode(&upload).unwrap();
        assert_eq!(out[..2], JPEG_MAGIC);
    }

    #[test]
    fn test_jpeg_input_round_trips() {
        let jpeg = encode(
            &DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]))),
            ImageFormat::Jpeg,
        );
        let upload = ImageUpload::new(Some("x.jpeg".to_string()), jpeg);
        assert!(JpegCodec::default().reencode(&upload).is_ok());
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let upload = ImageUpload::new(Some("evil.png".to_string()), b"not an image".to_vec());

        let err = JpegCodec::default().reencode(&upload).unwrap_err();
        assert!(matches!(err, EphemeraError::Decode(_)));
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_name_hint_wins_over_contents() {
        let upload = ImageUpload::new(Some("mislabelled.jpg".to_string()), png_bytes());
        assert!(JpegCodec::default().reencode(&upload).is_err());
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(JpegCodec::new(0).quality(), 1);
        assert_eq!(JpegCodec::new(255).quality(), 100);
    }
}
