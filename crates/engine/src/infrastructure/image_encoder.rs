//! Upload encoder: arbitrary image bytes to a JPEG data URL.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::Path;

use aistudio_domain::ImageRef;

use crate::infrastructure::ports::{ImageEncodeError, ImageEncoderPort};

/// Uploads above this size are rejected before decoding.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
/// Longer edge of the re-encoded image.
pub const MAX_EDGE_PX: u32 = 1920;
pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy)]
pub struct JpegDataUrlEncoder {
    max_bytes: u64,
    max_edge: u32,
    quality: u8,
}

impl Default for JpegDataUrlEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JpegDataUrlEncoder {
    pub fn new() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            max_edge: MAX_EDGE_PX,
            quality: JPEG_QUALITY,
        }
    }

    fn check_size(&self, size: u64) -> Result<(), ImageEncodeError> {
        if size > self.max_bytes {
            return Err(ImageEncodeError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    fn downscale(&self, image: DynamicImage) -> DynamicImage {
        if image.width().max(image.height()) <= self.max_edge {
            return image;
        }
        // `resize` fits within the bounds and keeps the aspect ratio
        image.resize(self.max_edge, self.max_edge, FilterType::Triangle)
    }
}

impl ImageEncoderPort for JpegDataUrlEncoder {
    fn encode(&self, bytes: &[u8]) -> Result<ImageRef, ImageEncodeError> {
        self.check_size(bytes.len() as u64)?;

        let format = image::guess_format(bytes)
            .map_err(|e| ImageEncodeError::UnsupportedFormat(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImageEncodeError::UnsupportedFormat(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let resized = self.downscale(decoded);

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut jpeg = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, self.quality))
            .map_err(|e| ImageEncodeError::Encode(e.to_string()))?;

        tracing::debug!(
            source_format = ?format,
            source_width = width,
            source_height = height,
            width = rgb.width(),
            height = rgb.height(),
            bytes = jpeg.len(),
            "Encoded upload"
        );

        Ok(ImageRef::data_url("image/jpeg", &STANDARD.encode(&jpeg)))
    }

    /// The size limit is checked from metadata so oversized files are never
    /// read into memory.
    fn encode_file(&self, path: &Path) -> Result<ImageRef, ImageEncodeError> {
        let metadata = std::fs::metadata(path).map_err(|e| ImageEncodeError::Io(e.to_string()))?;
        self.check_size(metadata.len())?;

        let bytes = std::fs::read(path).map_err(|e| ImageEncodeError::Io(e.to_string()))?;
        self.encode(&bytes)
    }
}
