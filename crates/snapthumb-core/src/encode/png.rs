//! Lossless PNG encoding for export.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::EncodeError;
use crate::bitmap::Bitmap;
use crate::format::ExportFormat;

/// Encode a bitmap to PNG bytes, keeping the alpha channel if present.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let color_type = if bitmap.has_alpha() {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    };

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive)
        .write_image(bitmap.pixels(), bitmap.width(), bitmap.height(), color_type)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ExportFormat::Png,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}
