//! WASM-compatible wrapper types for export data.
//!
//! This module provides JavaScript-friendly types that wrap the core Snapthumb
//! types, handling the conversion between Rust and JavaScript representations.

use snapthumb_core::{Bitmap, CompressionPreset, ExportFormat, ExportResult};
use wasm_bindgen::prelude::*;

/// Convert any displayable error into a JavaScript error value.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a format name such as `"jpeg"`, `"webp"` or `"png"`.
pub(crate) fn parse_format(format: &str) -> Result<ExportFormat, JsValue> {
    format.parse::<ExportFormat>().map_err(to_js_error)
}

/// A rendered surface to export.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is
/// made to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsBitmap {
    inner: Bitmap,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Create a bitmap from canvas pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `channels` - 3 for RGB, 4 for RGBA (`ImageData.data` is RGBA)
    /// * `pixels` - Interleaved pixel data, row-major order
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<JsBitmap, JsValue> {
        Bitmap::new(width, height, channels, pixels)
            .map(|inner| JsBitmap { inner })
            .map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u8 {
        self.inner.channels()
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }
}

impl JsBitmap {
    pub(crate) fn inner(&self) -> &Bitmap {
        &self.inner
    }
}

/// Compression preset wrapper for JavaScript.
#[wasm_bindgen]
#[derive(Clone, Copy)]
pub struct JsCompressionPreset {
    inner: CompressionPreset,
}

#[wasm_bindgen]
impl JsCompressionPreset {
    /// Create a preset. Values are validated when an export starts.
    #[wasm_bindgen(constructor)]
    pub fn new(quality: f64, ssim_threshold: f64, target_size_mb: f64) -> JsCompressionPreset {
        Self {
            inner: CompressionPreset::new(quality, ssim_threshold, target_size_mb),
        }
    }

    pub fn low() -> JsCompressionPreset {
        Self {
            inner: CompressionPreset::LOW,
        }
    }

    pub fn medium() -> JsCompressionPreset {
        Self {
            inner: CompressionPreset::MEDIUM,
        }
    }

    pub fn high() -> JsCompressionPreset {
        Self {
            inner: CompressionPreset::HIGH,
        }
    }

    /// Look up a canonical preset by name (`"low"`, `"medium"`, `"high"`).
    pub fn named(name: &str) -> Result<JsCompressionPreset, JsValue> {
        let level: snapthumb_core::PresetLevel = name.parse().map_err(to_js_error)?;
        Ok(Self {
            inner: level.preset(),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f64 {
        self.inner.quality
    }

    #[wasm_bindgen(getter)]
    pub fn ssim_threshold(&self) -> f64 {
        self.inner.ssim_threshold
    }

    #[wasm_bindgen(getter)]
    pub fn target_size_mb(&self) -> f64 {
        self.inner.target_size_mb
    }

    /// Serialize to a plain object (`{ quality, ssimThreshold, targetSizeMB }`)
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain object
    pub fn from_json(value: JsValue) -> Result<JsCompressionPreset, JsValue> {
        let inner: CompressionPreset = serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }
}

impl JsCompressionPreset {
    pub(crate) fn inner(&self) -> &CompressionPreset {
        &self.inner
    }
}

/// Result of a sized export.
#[wasm_bindgen]
pub struct JsExportResult {
    inner: ExportResult,
}

#[wasm_bindgen]
impl JsExportResult {
    /// Encoded file as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        self.inner.format.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn final_quality(&self) -> f64 {
        self.inner.final_quality
    }

    /// Encoded size in bytes (f64 so it is a plain JS number).
    #[wasm_bindgen(getter)]
    pub fn final_size_bytes(&self) -> f64 {
        self.inner.final_size_bytes as f64
    }

    /// SSIM against the source, or `undefined` when not measured.
    #[wasm_bindgen(getter)]
    pub fn ssim(&self) -> Option<f64> {
        self.inner.ssim
    }

    #[wasm_bindgen(getter)]
    pub fn met_budget(&self) -> bool {
        self.inner.met_budget
    }

    #[wasm_bindgen(getter)]
    pub fn met_fidelity(&self) -> bool {
        self.inner.met_fidelity
    }

    #[wasm_bindgen(getter)]
    pub fn attempt_count(&self) -> usize {
        self.inner.attempts.len()
    }

    /// Search trace as an array of `{ quality, sizeBytes, ssim }`.
    pub fn attempts(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.attempts).map_err(to_js_error)
    }
}

impl From<ExportResult> for JsExportResult {
    fn from(inner: ExportResult) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_bitmap_accessors() {
        let bitmap = JsBitmap {
            inner: Bitmap::rgba(10, 5, vec![0u8; 10 * 5 * 4]).unwrap(),
        };
        assert_eq!(bitmap.width(), 10);
        assert_eq!(bitmap.height(), 5);
        assert_eq!(bitmap.channels(), 4);
        assert_eq!(bitmap.byte_length(), 200);
        assert_eq!(bitmap.pixels().len(), 200);
    }

    #[test]
    fn test_named_presets() {
        assert_eq!(*JsCompressionPreset::low().inner(), CompressionPreset::LOW);
        assert_eq!(*JsCompressionPreset::medium().inner(), CompressionPreset::MEDIUM);
        assert_eq!(*JsCompressionPreset::high().inner(), CompressionPreset::HIGH);
    }

    #[test]
    fn test_preset_accessors() {
        let preset = JsCompressionPreset::new(0.7, 0.85, 1.5);
        assert_eq!(preset.quality(), 0.7);
        assert_eq!(preset.ssim_threshold(), 0.85);
        assert_eq!(preset.target_size_mb(), 1.5);
    }

    #[test]
    fn test_export_result_wrapper() {
        let result = ExportResult {
            bytes: vec![1, 2, 3],
            format: ExportFormat::Webp,
            final_quality: 0.5,
            final_size_bytes: 3,
            ssim: Some(0.97),
            met_budget: true,
            met_fidelity: false,
            attempts: Vec::new(),
        };
        let js = JsExportResult::from(result);

        assert_eq!(js.bytes(), vec![1, 2, 3]);
        assert_eq!(js.format(), "webp");
        assert_eq!(js.mime_type(), "image/webp");
        assert_eq!(js.final_size_bytes(), 3.0);
        assert_eq!(js.ssim(), Some(0.97));
        assert!(js.met_budget());
        assert!(!js.met_fidelity());
        assert_eq!(js.attempt_count(), 0);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_js_bitmap_rejects_bad_length() {
        assert!(JsBitmap::new(10, 10, 3, vec![0u8; 10]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_preset_json_round_trip() {
        let preset = JsCompressionPreset::new(0.8, 0.8, 2.0);
        let json = preset.to_json().unwrap();
        let back = JsCompressionPreset::from_json(json).unwrap();
        assert_eq!(*back.inner(), *preset.inner());
    }

    #[wasm_bindgen_test]
    fn test_unknown_preset_name() {
        assert!(JsCompressionPreset::named("ultra").is_err());
    }
}
