//! Export sizing WASM bindings.
//!
//! The search runs as a Promise so the export dialog can keep rendering while
//! a large surface is encoded several times. The bitmap and preset are copied
//! into the future up front, so the JavaScript objects stay usable.
//!
//! # Example
//!
//! ```typescript
//! import { JsBitmap, JsCompressionPreset, JsCancelHandle, size_export_cancellable } from '@snapthumb/wasm';
//!
//! const data = ctx.getImageData(0, 0, w, h);
//! const bitmap = new JsBitmap(w, h, 4, new Uint8Array(data.data.buffer));
//! const cancel = new JsCancelHandle();
//! dialog.onClose = () => cancel.cancel();
//!
//! const result = await size_export_cancellable(bitmap, 'jpeg', JsCompressionPreset.medium(), cancel);
//! if (!result.met_budget) showToast('File is larger than the target size');
//! const blob = new Blob([result.bytes()], { type: result.mime_type });
//! ```

use js_sys::Promise;
use snapthumb_core::{ExportFormat, ExportSizer};
use tokio_util::sync::CancellationToken;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::types::{parse_format, to_js_error, JsBitmap, JsCompressionPreset, JsExportResult};

/// Cancellation signal for an in-progress export.
///
/// Calling `cancel()` makes the pending `size_export_cancellable` Promise
/// reject with `"Export cancelled"`; no further encodes are started.
#[wasm_bindgen]
#[derive(Clone, Default)]
pub struct JsCancelHandle {
    token: CancellationToken,
}

#[wasm_bindgen]
impl JsCancelHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsCancelHandle {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[wasm_bindgen(getter)]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl JsCancelHandle {
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Find the highest-quality encoding of `bitmap` that fits the preset's size target.
///
/// Resolves to a `JsExportResult`. Missing the budget or the fidelity floor is
/// reported via `met_budget` / `met_fidelity`, not by rejecting.
///
/// # Errors
///
/// The Promise rejects if the format is unknown, the preset is out of range,
/// or encoding fails.
#[wasm_bindgen]
pub fn size_export(bitmap: &JsBitmap, format: &str, preset: &JsCompressionPreset) -> Result<Promise, JsValue> {
    spawn_export(bitmap, format, preset, None)
}

/// Same as `size_export`, but stops when `cancel.cancel()` is called.
#[wasm_bindgen]
pub fn size_export_cancellable(
    bitmap: &JsBitmap,
    format: &str,
    preset: &JsCompressionPreset,
    cancel: &JsCancelHandle,
) -> Result<Promise, JsValue> {
    spawn_export(bitmap, format, preset, Some(cancel.token()))
}

/// Encoded size in bytes at a single quality, for a live size preview.
#[wasm_bindgen]
pub fn estimate_size(bitmap: &JsBitmap, format: &str, quality: f64) -> Result<Promise, JsValue> {
    let format = parse_format(format)?;
    let bitmap = bitmap.inner().clone();

    Ok(future_to_promise(async move {
        let size = ExportSizer::new()
            .estimate_size(&bitmap, format, quality)
            .await
            .map_err(to_js_error)?;
        Ok(JsValue::from_f64(size as f64))
    }))
}

fn spawn_export(
    bitmap: &JsBitmap,
    format: &str,
    preset: &JsCompressionPreset,
    cancel: Option<CancellationToken>,
) -> Result<Promise, JsValue> {
    let format: ExportFormat = parse_format(format)?;
    let bitmap = bitmap.inner().clone();
    let preset = *preset.inner();

    Ok(future_to_promise(async move {
        let result = ExportSizer::new()
            .size_export(&bitmap, format, &preset, cancel.as_ref())
            .await
            .map_err(to_js_error)?;
        Ok(JsExportResult::from(result).into())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_handle_shares_token() {
        let handle = JsCancelHandle::new();
        let token = handle.token();
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(token.is_cancelled());
    }
}
