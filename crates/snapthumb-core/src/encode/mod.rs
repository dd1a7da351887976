//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding bitmaps to JPEG with configurable quality
//! - Encoding bitmaps to WebP with quality-driven bit-depth reduction
//! - Encoding bitmaps to lossless PNG
//!
//! # Architecture
//!
//! The encoders are plain synchronous functions over a validated [`Bitmap`].
//! They are designed to be used from Web Workers via WASM bindings, so none of
//! them pull in C libraries. The sizer reaches them through the
//! [`Codec`](crate::codec::Codec) trait.
//!
//! # Examples
//!
//! ```ignore
//! use snapthumb_core::{encode::encode_jpeg, Bitmap};
//!
//! let bitmap = Bitmap::rgb(100, 100, vec![128u8; 100 * 100 * 3]).unwrap();
//! let jpeg_bytes = encode_jpeg(&bitmap, 90).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;
mod png;
mod webp;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use webp::encode_webp;

use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::format::ExportFormat;

/// Errors that can occur while encoding a bitmap.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Quality is NaN or outside (0, 1].
    #[error("Invalid quality {0}: must be in (0, 1]")]
    InvalidQuality(f64),

    /// The underlying encoder reported an error.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ExportFormat,
        message: String,
    },

    /// The encoder finished but produced no bytes.
    #[error("{0} encoder produced no output")]
    EmptyOutput(ExportFormat),
}

/// Map a normalized quality in (0, 1] to the 1-100 scale used by the encoders.
#[inline]
pub fn quality_to_u8(quality: f64) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a bitmap in the given format.
///
/// `quality` is normalized to (0, 1] and ignored for lossless formats.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidQuality`] for out-of-range quality,
/// [`EncodeError::EmptyOutput`] if the encoder produced zero bytes, and
/// [`EncodeError::EncodingFailed`] for encoder errors.
pub fn encode(bitmap: &Bitmap, format: ExportFormat, quality: f64) -> Result<Vec<u8>, EncodeError> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(EncodeError::InvalidQuality(quality));
    }

    let bytes = match format {
        ExportFormat::Jpeg => encode_jpeg(bitmap, quality_to_u8(quality))?,
        ExportFormat::Webp => encode_webp(bitmap, quality_to_u8(quality))?,
        ExportFormat::Png => encode_png(bitmap)?,
    };

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput(format));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_bitmap(size: u32) -> Bitmap {
        Bitmap::rgb(size, size, vec![128u8; (size * size * 3) as usize]).unwrap()
    }

    #[test]
    fn test_quality_to_u8() {
        assert_eq!(quality_to_u8(1.0), 100);
        assert_eq!(quality_to_u8(0.8), 80);
        assert_eq!(quality_to_u8(0.05), 5);
        assert_eq!(quality_to_u8(0.001), 1);
    }

    #[test]
    fn test_encode_dispatches_by_format() {
        let bitmap = gray_bitmap(16);

        let jpeg = encode(&bitmap, ExportFormat::Jpeg, 0.9).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let png = encode(&bitmap, ExportFormat::Png, 0.9).unwrap();
        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let webp = encode(&bitmap, ExportFormat::Webp, 0.9).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_encode_rejects_invalid_quality() {
        let bitmap = gray_bitmap(4);

        for quality in [0.0, -0.5, 1.5, f64::NAN] {
            let result = encode(&bitmap, ExportFormat::Jpeg, quality);
            assert!(matches!(result, Err(EncodeError::InvalidQuality(_))));
        }
    }

    #[test]
    fn test_encode_error_display() {
        let err = EncodeError::EmptyOutput(ExportFormat::Webp);
        assert_eq!(err.to_string(), "webp encoder produced no output");

        let err = EncodeError::EncodingFailed {
            format: ExportFormat::Jpeg,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "jpeg encoding failed: boom");
    }
}
