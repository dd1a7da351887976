//! Raster surface handed to the export pipeline.

use thiserror::Error;

/// Errors raised when a pixel buffer does not describe a valid bitmap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitmapError {
    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Only RGB and RGBA layouts are supported.
    #[error("Unsupported channel count {0}: expected 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),

    /// Pixel data length doesn't match width * height * channels.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// An 8-bit RGB or RGBA pixel grid in row-major order.
///
/// A `Bitmap` is validated on construction and never mutated afterwards, so
/// every encoder and comparator can rely on `pixels.len() == width * height *
/// channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap from raw interleaved pixel data.
    ///
    /// # Errors
    ///
    /// Returns a [`BitmapError`] if a dimension is zero, `channels` is not 3 or
    /// 4, or the buffer length does not match.
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::InvalidDimensions { width, height });
        }
        if channels != 3 && channels != 4 {
            return Err(BitmapError::UnsupportedChannels(channels));
        }

        let expected = (width as usize) * (height as usize) * channels as usize;
        if pixels.len() != expected {
            return Err(BitmapError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Create an RGB bitmap (3 bytes per pixel).
    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        Self::new(width, height, 3, pixels)
    }

    /// Create an RGBA bitmap (4 bytes per pixel).
    pub fn rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        Self::new(width, height, 4, pixels)
    }

    /// Create a Bitmap from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Result<Self, BitmapError> {
        let (width, height) = img.dimensions();
        Self::rgb(width, height, img.into_raw())
    }

    /// Create a Bitmap from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Result<Self, BitmapError> {
        let (width, height) = img.dimensions();
        Self::rgba(width, height, img.into_raw())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel: 3 for RGB, 4 for RGBA.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Interleaved pixel data in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Consume the bitmap and return its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGB view of the pixel data.
    ///
    /// RGB bitmaps are copied as-is. RGBA bitmaps are composited over black,
    /// matching how a canvas flattens transparency when exporting to a format
    /// without alpha.
    pub fn to_rgb8(&self) -> Vec<u8> {
        if !self.has_alpha() {
            return self.pixels.clone();
        }

        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for px in self.pixels.chunks_exact(4) {
            let alpha = px[3] as u32;
            for &c in &px[..3] {
                rgb.push(((c as u32 * alpha + 127) / 255) as u8);
            }
        }
        rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_creation() {
        let bitmap = Bitmap::rgb(100, 50, vec![0u8; 100 * 50 * 3]).unwrap();

        assert_eq!(bitmap.width(), 100);
        assert_eq!(bitmap.height(), 50);
        assert_eq!(bitmap.channels(), 3);
        assert_eq!(bitmap.pixel_count(), 5000);
        assert_eq!(bitmap.byte_size(), 15000);
        assert!(!bitmap.has_alpha());
    }

    #[test]
    fn test_bitmap_rgba() {
        let bitmap = Bitmap::rgba(2, 2, vec![255u8; 16]).unwrap();
        assert!(bitmap.has_alpha());
        assert_eq!(bitmap.byte_size(), 16);
    }

    #[test]
    fn test_bitmap_zero_dimensions() {
        assert_eq!(
            Bitmap::rgb(0, 10, vec![]),
            Err(BitmapError::InvalidDimensions { width: 0, height: 10 })
        );
        assert!(matches!(
            Bitmap::rgb(10, 0, vec![]),
            Err(BitmapError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_bitmap_unsupported_channels() {
        assert_eq!(
            Bitmap::new(1, 1, 2, vec![0, 0]),
            Err(BitmapError::UnsupportedChannels(2))
        );
    }

    #[test]
    fn test_bitmap_wrong_length() {
        assert_eq!(
            Bitmap::rgb(10, 10, vec![0u8; 299]),
            Err(BitmapError::InvalidPixelData {
                expected: 300,
                actual: 299
            })
        );
    }

    #[test]
    fn test_to_rgb8_passthrough() {
        let pixels = vec![255u8, 128, 64, 32, 16, 8];
        let bitmap = Bitmap::rgb(2, 1, pixels.clone()).unwrap();
        assert_eq!(bitmap.to_rgb8(), pixels);
    }

    #[test]
    fn test_to_rgb8_composites_alpha_over_black() {
        let bitmap = Bitmap::rgba(3, 1, vec![200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128])
            .unwrap();
        let rgb = bitmap.to_rgb8();

        assert_eq!(&rgb[0..3], &[200, 100, 50]);
        assert_eq!(&rgb[3..6], &[0, 0, 0]);
        assert_eq!(&rgb[6..9], &[128, 128, 128]);
    }

    #[test]
    fn test_from_rgb_image() {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        let bitmap = Bitmap::from_rgb_image(img).unwrap();

        assert_eq!(bitmap.width(), 4);
        assert_eq!(bitmap.height(), 3);
        assert_eq!(&bitmap.pixels()[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_bitmap_error_display() {
        let err = BitmapError::UnsupportedChannels(1);
        assert_eq!(
            err.to_string(),
            "Unsupported channel count 1: expected 3 (RGB) or 4 (RGBA)"
        );
    }
}
