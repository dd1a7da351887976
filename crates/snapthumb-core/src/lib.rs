//! Snapthumb Core - export sizing library
//!
//! This crate turns a rendered thumbnail into a downloadable file that fits a
//! byte budget. It provides encoders for JPEG, WebP and PNG, a luma SSIM
//! comparator, compression presets, and the [`ExportSizer`] that searches for
//! the highest quality fitting the budget.
//!
//! # Module Structure
//!
//! - `bitmap` - Validated RGB/RGBA pixel grid
//! - `format` - Output formats and their MIME types
//! - `encode` / `decode` - `image` crate backed codecs
//! - `codec` - The async codec seam the sizer drives
//! - `luminance` / `ssim` - Fidelity measurement
//! - `preset` / `config` - Presets and search tunables
//! - `sizer` - The quality search itself

pub mod bitmap;
pub mod codec;
pub mod config;
pub mod decode;
pub mod encode;
pub mod format;
pub mod luminance;
pub mod preset;
pub mod sizer;
pub mod ssim;

pub use bitmap::{Bitmap, BitmapError};
pub use codec::{Codec, ImageCodec};
pub use config::{ConfigError, SizerConfig};
pub use decode::DecodeError;
pub use encode::EncodeError;
pub use format::{ExportFormat, UnknownFormat};
pub use preset::{CompressionPreset, PresetError, PresetLevel};
pub use sizer::{size_export, EncodeAttempt, ExportError, ExportResult, ExportSizer};
pub use ssim::{LumaSsim, SsimComparator, SsimError};

/// Re-exported so callers can build cancellation signals without a direct dependency.
pub use tokio_util::sync::CancellationToken;
