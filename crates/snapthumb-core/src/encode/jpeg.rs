//! JPEG encoding for export.
//!
//! Uses the `image` crate's baseline JPEG encoder. RGBA bitmaps are flattened
//! over black before encoding since JPEG has no alpha channel.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::EncodeError;
use crate::bitmap::Bitmap;
use crate::format::ExportFormat;

/// Encode a bitmap to JPEG bytes.
///
/// # Arguments
///
/// * `bitmap` - Source pixels (RGB or RGBA)
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let quality = quality.clamp(1, 100);
    let rgb = bitmap.to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(&rgb, bitmap.width(), bitmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ExportFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}
