//! Luminance calculation utilities using ITU-R BT.709 coefficients.
//!
//! Fidelity is measured on luma only, so every comparison starts by
//! collapsing a bitmap to a single plane here.

use crate::bitmap::Bitmap;

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f64 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f64 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f64 = 0.0722;

/// Calculate luminance from u8 RGB values, returned on the 0-255 scale.
#[inline]
pub fn calculate_luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMINANCE_R * r as f64 + LUMINANCE_G * g as f64 + LUMINANCE_B * b as f64
}

/// Extract the luma plane of a bitmap (row-major, 0-255 scale).
///
/// The alpha channel of RGBA bitmaps is ignored.
pub fn luma_plane(bitmap: &Bitmap) -> Vec<f64> {
    bitmap
        .pixels()
        .chunks_exact(bitmap.channels() as usize)
        .map(|px| calculate_luminance(px[0], px[1], px[2]))
        .collect()
}
