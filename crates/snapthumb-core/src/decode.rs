//! Decoding of encoded export candidates back to pixels.
//!
//! The sizer only needs this to measure fidelity: an encoded candidate is
//! decoded and compared against the original bitmap.

use std::io::Cursor;

use image::{DynamicImage, ImageReader};
use thiserror::Error;

use crate::bitmap::{Bitmap, BitmapError};
use crate::format::ExportFormat;

/// Error types for decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not in the expected format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image data is corrupted or incomplete.
    #[error("Corrupted or incomplete image data: {0}")]
    CorruptedFile(String),

    /// The decoded pixels could not be turned into a bitmap.
    #[error("Decoded image is not a valid bitmap: {0}")]
    InvalidBitmap(#[from] BitmapError),
}

/// Decode `bytes` that were produced in `format`.
///
/// Images with an alpha channel decode to RGBA bitmaps; everything else
/// decodes to RGB.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are empty and
/// `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_bitmap(bytes: &[u8], format: ExportFormat) -> Result<Bitmap, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format.to_image_format());

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(into_bitmap(img)?)
}

fn into_bitmap(img: DynamicImage) -> Result<Bitmap, BitmapError> {
    if img.color().has_alpha() {
        Bitmap::from_rgba_image(img.into_rgba8())
    } else {
        Bitmap::from_rgb_image(img.into_rgb8())
    }
}
