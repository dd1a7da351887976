//! WebP encoding for export.
//!
//! The `image` crate only ships a lossless VP8L encoder. Lossy behavior is
//! obtained by reducing the color channels to a quality-dependent bit depth
//! first. The bit-depth grids are nested (every 5-bit value is also a 6-bit
//! value), and quality 100 is left untouched (exact lossless). Alpha is never
//! quantized.
//!
//! VP8L predicts each pixel from its neighbors, so coarser channels do not
//! always compress smaller: stair-stepped gradients can cost more than the
//! smooth original. To keep output size non-decreasing in quality, a quality
//! maps to the smallest encoding among its own bit depth and every finer one.
//! The result is never less precise than the requested depth.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::EncodeError;
use crate::bitmap::Bitmap;
use crate::format::ExportFormat;

/// Coarsest channel depth, used for quality 1.
const MIN_BITS: u8 = 3;

/// Full channel depth, used only for quality 100.
const FULL_BITS: u8 = 8;

/// Encode a bitmap to WebP bytes.
///
/// # Arguments
///
/// * `bitmap` - Source pixels (RGB or RGBA; alpha is preserved)
/// * `quality` - Quality (1-100); 100 is lossless
pub fn encode_webp(bitmap: &Bitmap, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let requested = bits_for_quality(quality.clamp(1, 100));

    let mut best = encode_at_depth(bitmap, FULL_BITS)?;
    for bits in (requested..FULL_BITS).rev() {
        let candidate = encode_at_depth(bitmap, bits)?;
        // Ties keep the finer depth.
        if candidate.len() < best.len() {
            best = candidate;
        }
    }
    Ok(best)
}

fn encode_at_depth(bitmap: &Bitmap, bits: u8) -> Result<Vec<u8>, EncodeError> {
    let mut pixels = bitmap.pixels().to_vec();
    quantize_channels(&mut pixels, bitmap.channels() as usize, bits);

    let color_type = if bitmap.has_alpha() {
        ExtendedColorType::Rgba8
    } else {
        ExtendedColorType::Rgb8
    };

    let mut buffer = Cursor::new(Vec::new());
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(&pixels, bitmap.width(), bitmap.height(), color_type)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ExportFormat::Webp,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

/// Round every color channel to the nearest multiple of `2^(8 - bits)`.
/// The alpha channel (index 3) is left as-is.
fn quantize_channels(data: &mut [u8], channels: usize, bits: u8) {
    if bits >= FULL_BITS {
        return;
    }
    let shift = FULL_BITS - bits;
    let half = 1u16 << (shift - 1);
    let top = 256 - (1u16 << shift);

    for pixel in data.chunks_exact_mut(channels) {
        for channel in pixel.iter_mut().take(3) {
            let snapped = ((u16::from(*channel) + half) >> shift) << shift;
            *channel = snapped.min(top) as u8;
        }
    }
}

/// Channel bit depth for a 1-100 quality: 3 bits at the bottom, one more bit
/// per fifth of the range, and full depth only at 100.
fn bits_for_quality(quality: u8) -> u8 {
    if quality >= 100 {
        return FULL_BITS;
    }
    let span = u16::from(FULL_BITS - MIN_BITS);
    let step = (u16::from(quality.max(1)) - 1) * span / 99;
    MIN_BITS + step as u8
}
