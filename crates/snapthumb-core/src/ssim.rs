//! Structural similarity (SSIM) between two bitmaps.
//!
//! Fidelity is measured with standard single-scale SSIM over the luma channel:
//!
//! ```text
//! SSIM(x, y) = (2·μx·μy + C1)(2·σxy + C2) / ((μx² + μy² + C1)(σx² + σy² + C2))
//! ```
//!
//! evaluated on 8×8 windows placed every 4 pixels and averaged. C1 and C2 use
//! the usual K1 = 0.01, K2 = 0.03 on a 0-255 dynamic range.
//!
//! Large bitmaps are downsampled before comparison. An export preview does not
//! need full-resolution fidelity and SSIM over a 4K frame is expensive in WASM.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use thiserror::Error;

use crate::bitmap::Bitmap;
use crate::luminance::luma_plane;

/// (K1 · 255)²
pub const C1: f64 = 6.5025;

/// (K2 · 255)²
pub const C2: f64 = 58.5225;

/// Side length of the square SSIM window.
pub const WINDOW_SIZE: u32 = 8;

/// Distance between neighboring window origins.
pub const WINDOW_STRIDE: u32 = 4;

/// Default longest edge that comparisons are downsampled to.
pub const DEFAULT_MAX_EDGE: u32 = 512;

/// Errors raised by a fidelity comparison.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SsimError {
    /// The two bitmaps do not have the same dimensions.
    #[error("Cannot compare {left_width}x{left_height} with {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },
}

/// Perceptual fidelity comparator.
///
/// Implementations must be symmetric and return exactly 1.0 for identical
/// inputs. Scores are in [0, 1].
pub trait SsimComparator: Send + Sync {
    fn compare(&self, a: &Bitmap, b: &Bitmap) -> Result<f64, SsimError>;
}

/// Single-scale luma SSIM with optional downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumaSsim {
    /// Longest edge after downsampling. `0` compares at full resolution.
    pub max_edge: u32,
}

impl Default for LumaSsim {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
        }
    }
}

impl LumaSsim {
    pub fn new(max_edge: u32) -> Self {
        Self { max_edge }
    }

    /// Comparator that never downsamples.
    pub fn full_resolution() -> Self {
        Self { max_edge: 0 }
    }
}

impl SsimComparator for LumaSsim {
    fn compare(&self, a: &Bitmap, b: &Bitmap) -> Result<f64, SsimError> {
        if a.width() != b.width() || a.height() != b.height() {
            return Err(SsimError::DimensionMismatch {
                left_width: a.width(),
                left_height: a.height(),
                right_width: b.width(),
                right_height: b.height(),
            });
        }

        let left = Plane::from_bitmap(a, self.max_edge);
        let right = Plane::from_bitmap(b, self.max_edge);
        Ok(mean_ssim(&left, &right))
    }
}

/// A single-channel image on the 0-255 scale.
struct Plane {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl Plane {
    fn from_bitmap(bitmap: &Bitmap, max_edge: u32) -> Self {
        let (width, height) = (bitmap.width(), bitmap.height());
        let data = luma_plane(bitmap);

        if max_edge == 0 || (width <= max_edge && height <= max_edge) {
            return Self {
                width,
                height,
                data,
            };
        }

        let (new_width, new_height) = fit_dimensions(width, height, max_edge);
        let buffer: Option<ImageBuffer<Luma<f32>, Vec<f32>>> =
            ImageBuffer::from_raw(width, height, data.iter().map(|&v| v as f32).collect());

        match buffer {
            Some(buffer) => {
                let resized = imageops::resize(&buffer, new_width, new_height, FilterType::Triangle);
                Self {
                    width: new_width,
                    height: new_height,
                    data: resized.into_raw().into_iter().map(f64::from).collect(),
                }
            }
            // Length always matches for a validated bitmap; compare at full size otherwise.
            None => Self {
                width,
                height,
                data,
            },
        }
    }

    #[inline]
    fn at(&self, x: u32, y: u32) -> f64 {
        self.data[(y as usize) * (self.width as usize) + x as usize]
    }
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

/// Mean SSIM over all windows. Windows shrink to the image when a side is
/// shorter than `WINDOW_SIZE`.
fn mean_ssim(a: &Plane, b: &Plane) -> f64 {
    let win_w = WINDOW_SIZE.min(a.width);
    let win_h = WINDOW_SIZE.min(a.height);

    let mut total = 0.0;
    let mut count = 0u64;

    for y in (0..=a.height - win_h).step_by(WINDOW_STRIDE as usize) {
        for x in (0..=a.width - win_w).step_by(WINDOW_STRIDE as usize) {
            total += window_ssim(a, b, x, y, win_w, win_h);
            count += 1;
        }
    }

    if count == 0 {
        return 1.0;
    }
    (total / count as f64).clamp(0.0, 1.0)
}

fn window_ssim(a: &Plane, b: &Plane, x0: u32, y0: u32, w: u32, h: u32) -> f64 {
    let n = (w * h) as f64;
    let (mut sum_a, mut sum_b) = (0.0, 0.0);
    let (mut sum_aa, mut sum_bb, mut sum_ab) = (0.0, 0.0, 0.0);

    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let va = a.at(x, y);
            let vb = b.at(x, y);
            sum_a += va;
            sum_b += vb;
            sum_aa += va * va;
            sum_bb += vb * vb;
            sum_ab += va * vb;
        }
    }

    let mu_a = sum_a / n;
    let mu_b = sum_b / n;
    let var_a = sum_aa / n - mu_a * mu_a;
    let var_b = sum_bb / n - mu_b * mu_b;
    let covar = sum_ab / n - mu_a * mu_b;

    let numerator = (2.0 * mu_a * mu_b + C1) * (2.0 * covar + C2);
    let denominator = (mu_a * mu_a + mu_b * mu_b + C1) * (var_a + var_b + C2);
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(((x + y) * 127 / (width + height)) as u8);
            }
        }
        Bitmap::rgb(width, height, pixels).unwrap()
    }

    fn with_noise(bitmap: &Bitmap, amplitude: i32) -> Bitmap {
        let pixels = bitmap
            .pixels()
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let offset = ((i * 7919) % (2 * amplitude as usize + 1)) as i32 - amplitude;
                (v as i32 + offset).clamp(0, 255) as u8
            })
            .collect();
        Bitmap::rgb(bitmap.width(), bitmap.height(), pixels).unwrap()
    }

    #[test]
    fn test_identical_is_one() {
        let bitmap = gradient(64, 48);
        let score = LumaSsim::default().compare(&bitmap, &bitmap).unwrap();
        assert!((score - 1.0).abs() < 1e-12, "got {}", score);
    }

    #[test]
    fn test_identical_flat_image_is_one() {
        let bitmap = Bitmap::rgb(16, 16, vec![0u8; 16 * 16 * 3]).unwrap();
        let score = LumaSsim::default().compare(&bitmap, &bitmap).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let a = gradient(40, 40);
        let b = with_noise(&a, 30);
        let ssim = LumaSsim::default();

        let ab = ssim.compare(&a, &b).unwrap();
        let ba = ssim.compare(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_more_noise_scores_lower() {
        let a = gradient(64, 64);
        let ssim = LumaSsim::full_resolution();

        let light = ssim.compare(&a, &with_noise(&a, 4)).unwrap();
        let heavy = ssim.compare(&a, &with_noise(&a, 60)).unwrap();
        assert!(light < 1.0);
        assert!(heavy < light, "heavy={} light={}", heavy, light);
        assert!((0.0..=1.0).contains(&heavy));
    }

    #[test]
    fn test_inverted_image_scores_low() {
        let a = gradient(32, 32);
        let inverted: Vec<u8> = a.pixels().iter().map(|v| 255 - v).collect();
        let b = Bitmap::rgb(32, 32, inverted).unwrap();

        let score = LumaSsim::default().compare(&a, &b).unwrap();
        assert!(score < 0.5, "got {}", score);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = gradient(10, 10);
        let b = gradient(10, 11);
        assert_eq!(
            LumaSsim::default().compare(&a, &b),
            Err(SsimError::DimensionMismatch {
                left_width: 10,
                left_height: 10,
                right_width: 10,
                right_height: 11,
            })
        );
    }

    #[test]
    fn test_tiny_images_use_clipped_window() {
        let a = Bitmap::rgb(3, 2, vec![100u8; 18]).unwrap();
        let score = LumaSsim::default().compare(&a, &a).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_downsampled_comparison() {
        let a = gradient(1200, 300);
        let b = with_noise(&a, 20);

        let coarse = LumaSsim::new(256).compare(&a, &b).unwrap();
        assert!((0.0..=1.0).contains(&coarse));
        assert!(coarse < 1.0);
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1920, 1080, 512), (512, 288));
        assert_eq!(fit_dimensions(1080, 1920, 512), (288, 512));
        assert_eq!(fit_dimensions(5000, 1, 100), (100, 1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn bitmap_strategy() -> impl Strategy<Value = (Bitmap, Bitmap)> {
        (1u32..=24, 1u32..=24).prop_flat_map(|(w, h)| {
            let size = (w * h * 3) as usize;
            (
                prop::collection::vec(any::<u8>(), size..=size),
                prop::collection::vec(any::<u8>(), size..=size),
            )
                .prop_map(move |(a, b)| {
                    (
                        Bitmap::rgb(w, h, a).unwrap(),
                        Bitmap::rgb(w, h, b).unwrap(),
                    )
                })
        })
    }

    proptest! {
        /// Property: Scores are always within [0, 1].
        #[test]
        fn prop_score_in_unit_range((a, b) in bitmap_strategy()) {
            let score = LumaSsim::default().compare(&a, &b).unwrap();
            prop_assert!((0.0..=1.0).contains(&score));
        }

        /// Property: Comparison is symmetric.
        #[test]
        fn prop_symmetric((a, b) in bitmap_strategy()) {
            let ssim = LumaSsim::default();
            let ab = ssim.compare(&a, &b).unwrap();
            let ba = ssim.compare(&b, &a).unwrap();
            prop_assert!((ab - ba).abs() < 1e-9);
        }

        /// Property: A bitmap compared with itself scores 1.0.
        #[test]
        fn prop_self_similarity((a, _) in bitmap_strategy()) {
            let score = LumaSsim::default().compare(&a, &a).unwrap();
            prop_assert!((score - 1.0).abs() < 1e-9);
        }
    }
}
