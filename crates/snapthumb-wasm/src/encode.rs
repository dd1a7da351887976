//! Direct encoding WASM bindings.
//!
//! For callers that already know the quality they want (e.g. "export at
//! original quality" or a PNG download) and do not need a size search.

use snapthumb_core::encode;
use wasm_bindgen::prelude::*;

use crate::types::{parse_format, to_js_error, JsBitmap};

/// Encode a bitmap in `format` (`"jpeg"`, `"webp"` or `"png"`) at a
/// normalized `quality` in (0, 1]. Quality is ignored for PNG.
///
/// # Example
///
/// ```typescript
/// const png = encode_image(bitmap, 'png', 1.0);
/// const blob = new Blob([png], { type: 'image/png' });
/// ```
#[wasm_bindgen]
pub fn encode_image(bitmap: &JsBitmap, format: &str, quality: f64) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(format)?;
    encode::encode(bitmap.inner(), format, quality).map_err(to_js_error)
}

/// Tests for encode bindings.
///
/// Functions returning `Result<T, JsValue>` only work on wasm32 targets; the
/// native test checks the core call the binding forwards to.
#[cfg(test)]
mod tests {
    use snapthumb_core::{Bitmap, ExportFormat};

    #[test]
    fn test_forwarded_encode_produces_jpeg() {
        let bitmap = Bitmap::rgba(10, 10, vec![128u8; 10 * 10 * 4]).unwrap();
        let jpeg = snapthumb_core::encode::encode(&bitmap, ExportFormat::Jpeg, 0.9).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_image_png() {
        let bitmap = JsBitmap::new(4, 4, 3, vec![10u8; 48]).unwrap();
        let png = encode_image(&bitmap, "png", 1.0).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[wasm_bindgen_test]
    fn test_encode_image_invalid_quality() {
        let bitmap = JsBitmap::new(4, 4, 3, vec![10u8; 48]).unwrap();
        assert!(encode_image(&bitmap, "jpeg", 0.0).is_err());
    }
}
