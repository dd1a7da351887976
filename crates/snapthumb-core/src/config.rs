//! Tunables for the quality search.
//!
//! Defaults reproduce the export dialog's behavior. A host can override any
//! subset of fields from JSON; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ssim::DEFAULT_MAX_EDGE;

/// Lowest quality the search will encode at.
pub const DEFAULT_FLOOR_QUALITY: f64 = 0.05;

/// Upper bound on encode calls per export.
pub const DEFAULT_MAX_ITERATIONS: u32 = 8;

/// Quality resolution below which the search stops.
pub const DEFAULT_CONVERGENCE_WINDOW: f64 = 0.02;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("floor quality {0} must be in (0, 1]")]
    FloorQuality(f64),

    #[error("max iterations must be at least 1")]
    MaxIterations,

    #[error("convergence window {0} must be in (0, 1)")]
    ConvergenceWindow(f64),

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Search parameters for [`size_export`](crate::sizer::size_export).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizerConfig {
    /// Initial lower bound of the quality search.
    pub floor_quality: f64,
    /// Maximum number of encode calls, including the floor fallback.
    pub max_iterations: u32,
    /// The search stops once `hi - lo` drops below this.
    pub convergence_window: f64,
    /// Longest edge for SSIM comparisons. `0` compares at full resolution.
    pub ssim_max_edge: u32,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            floor_quality: DEFAULT_FLOOR_QUALITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_window: DEFAULT_CONVERGENCE_WINDOW,
            ssim_max_edge: DEFAULT_MAX_EDGE,
        }
    }
}

impl SizerConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.floor_quality > 0.0 && self.floor_quality <= 1.0) {
            return Err(ConfigError::FloorQuality(self.floor_quality));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::MaxIterations);
        }
        if !(self.convergence_window > 0.0 && self.convergence_window < 1.0) {
            return Err(ConfigError::ConvergenceWindow(self.convergence_window));
        }
        Ok(())
    }
}
