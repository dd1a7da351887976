//! Compression presets offered by the export dialog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes in one megabyte as used for size targets (binary megabytes).
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reasons a preset is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PresetError {
    #[error("quality {0} is out of range: must be in (0, 1]")]
    Quality(f64),

    #[error("SSIM threshold {0} is out of range: must be in (0, 1]")]
    SsimThreshold(f64),

    #[error("target size {0} MB must be greater than zero")]
    TargetSize(f64),
}

/// Quality ceiling, fidelity floor and byte budget for one export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionPreset {
    /// Highest quality the search will try, in (0, 1].
    pub quality: f64,
    /// Minimum acceptable SSIM against the source, in (0, 1].
    pub ssim_threshold: f64,
    /// Byte budget in binary megabytes.
    #[serde(rename = "targetSizeMB")]
    pub target_size_mb: f64,
}

impl CompressionPreset {
    pub const LOW: Self = Self {
        quality: 0.6,
        ssim_threshold: 0.85,
        target_size_mb: 0.5,
    };

    pub const MEDIUM: Self = Self {
        quality: 0.8,
        ssim_threshold: 0.9,
        target_size_mb: 1.0,
    };

    pub const HIGH: Self = Self {
        quality: 0.92,
        ssim_threshold: 0.95,
        target_size_mb: 2.0,
    };

    pub fn new(quality: f64, ssim_threshold: f64, target_size_mb: f64) -> Self {
        Self {
            quality,
            ssim_threshold,
            target_size_mb,
        }
    }

    /// Check every field against its declared range. NaN is always rejected.
    pub fn validate(&self) -> Result<(), PresetError> {
        if !in_unit_interval(self.quality) {
            return Err(PresetError::Quality(self.quality));
        }
        if !in_unit_interval(self.ssim_threshold) {
            return Err(PresetError::SsimThreshold(self.ssim_threshold));
        }
        if !(self.target_size_mb > 0.0 && self.target_size_mb.is_finite()) {
            return Err(PresetError::TargetSize(self.target_size_mb));
        }
        Ok(())
    }

    /// Byte budget, rounded down to a whole byte.
    pub fn target_size_bytes(&self) -> u64 {
        (self.target_size_mb * BYTES_PER_MB).floor() as u64
    }
}

impl Default for CompressionPreset {
    fn default() -> Self {
        Self::MEDIUM
    }
}

#[inline]
fn in_unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

/// Named canonical presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl PresetLevel {
    pub fn preset(self) -> CompressionPreset {
        match self {
            PresetLevel::Low => CompressionPreset::LOW,
            PresetLevel::Medium => CompressionPreset::MEDIUM,
            PresetLevel::High => CompressionPreset::HIGH,
        }
    }
}

impl From<PresetLevel> for CompressionPreset {
    fn from(level: PresetLevel) -> Self {
        level.preset()
    }
}

impl fmt::Display for PresetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresetLevel::Low => "low",
            PresetLevel::Medium => "medium",
            PresetLevel::High => "high",
        };
        f.write_str(name)
    }
}

/// Error returned when a preset name is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown preset: {0:?} (expected low, medium or high)")]
pub struct UnknownPreset(pub String);

impl FromStr for PresetLevel {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(PresetLevel::Low),
            "medium" => Ok(PresetLevel::Medium),
            "high" => Ok(PresetLevel::High),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}
