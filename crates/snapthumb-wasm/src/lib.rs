//! Snapthumb WASM - WebAssembly bindings for the export sizer
//!
//! This crate exposes snapthumb-core to the editor's export dialog, which
//! runs it inside a Web Worker.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrappers for bitmaps, presets and results
//! - `export` - Promise-based size search with cancellation
//! - `encode` - Direct single-quality encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsBitmap, JsCompressionPreset, size_export } from '@snapthumb/wasm';
//!
//! await init();
//!
//! const bitmap = new JsBitmap(width, height, 4, rgbaPixels);
//! const result = await size_export(bitmap, 'webp', JsCompressionPreset.high());
//! console.log(`${result.final_size_bytes} bytes at q=${result.final_quality}`);
//! ```

use wasm_bindgen::prelude::*;

mod encode;
mod export;
mod types;

// Re-export public types
pub use encode::encode_image;
pub use export::{estimate_size, size_export, size_export_cancellable, JsCancelHandle};
pub use types::{JsBitmap, JsCompressionPreset, JsExportResult};

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
