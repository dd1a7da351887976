//! Output formats supported by the export pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a format name is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown export format: {0:?} (expected jpeg, webp or png)")]
pub struct UnknownFormat(pub String);

/// Encoded file format for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossy JPEG. Alpha is flattened.
    #[default]
    Jpeg,
    /// WebP with quality-driven bit-depth reduction.
    Webp,
    /// Lossless PNG. Quality search does not apply.
    Png,
}

impl ExportFormat {
    /// Returns true if the format ignores the quality parameter.
    #[inline]
    pub fn is_lossless(self) -> bool {
        matches!(self, ExportFormat::Png)
    }

    /// MIME type for downloads and uploads.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Png => "image/png",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Png => "png",
        }
    }

    /// Convert to the image crate's ImageFormat.
    pub fn to_image_format(self) -> image::ImageFormat {
        match self {
            ExportFormat::Jpeg => image::ImageFormat::Jpeg,
            ExportFormat::Webp => image::ImageFormat::WebP,
            ExportFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
            ExportFormat::Png => "png",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Ok(ExportFormat::Jpeg),
            "webp" | "image/webp" => Ok(ExportFormat::Webp),
            "png" | "image/png" => Ok(ExportFormat::Png),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}
