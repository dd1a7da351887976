//! Export sizing: find an encoding that fits a byte budget.
//!
//! The sizer binary-searches the codec quality between a floor and the
//! preset's ceiling, keeping the highest quality whose output fits the
//! budget. The winning candidate is then decoded and scored with SSIM against
//! the source so the caller can tell whether the fidelity floor held.
//!
//! Missing the budget or the fidelity floor is not an error. Both are
//! reported as flags on [`ExportResult`] and the caller decides whether to
//! warn or reject. Errors are reserved for invalid input, codec failures and
//! cancellation.
//!
//! # Example
//!
//! ```ignore
//! use snapthumb_core::{Bitmap, CompressionPreset, ExportFormat, ExportSizer};
//!
//! let sizer = ExportSizer::new();
//! let result = sizer
//!     .size_export(&bitmap, ExportFormat::Jpeg, &CompressionPreset::MEDIUM, None)
//!     .await?;
//! if !result.met_budget {
//!     println!("closest achievable: {} bytes", result.final_size_bytes);
//! }
//! ```

use std::pin::pin;

use futures_util::future::{select, Either};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::bitmap::Bitmap;
use crate::codec::{Codec, ImageCodec};
use crate::config::{ConfigError, SizerConfig};
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::format::ExportFormat;
use crate::preset::{CompressionPreset, PresetError};
use crate::ssim::{LumaSsim, SsimComparator, SsimError};

/// Quality reported for lossless exports.
const LOSSLESS_QUALITY: f64 = 1.0;

/// Failures of a sizing run. An unmet budget or fidelity floor is not one.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid preset: {0}")]
    InvalidPreset(#[from] PresetError),

    #[error("Invalid sizer config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Encode failed: {0}")]
    EncodeFailure(#[from] EncodeError),

    #[error("Could not decode export candidate: {0}")]
    DecodeFailure(#[from] DecodeError),

    #[error("Fidelity check failed: {0}")]
    Fidelity(#[from] SsimError),

    #[error("Export cancelled")]
    Cancelled,
}

/// One trial encode made during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeAttempt {
    pub quality: f64,
    pub size_bytes: u64,
    /// Only measured for the attempt that became the result.
    pub ssim: Option<f64>,
}

/// Outcome of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub final_quality: f64,
    pub final_size_bytes: u64,
    /// SSIM against the source. `None` for lossless formats, where it is not measured.
    pub ssim: Option<f64>,
    pub met_budget: bool,
    pub met_fidelity: bool,
    /// Every encode made, in order.
    pub attempts: Vec<EncodeAttempt>,
}

impl ExportResult {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn file_extension(&self) -> &'static str {
        self.format.extension()
    }

    /// True when both the byte budget and the fidelity floor were met.
    pub fn is_satisfactory(&self) -> bool {
        self.met_budget && self.met_fidelity
    }
}

/// An encode kept as a possible result.
struct Candidate {
    quality: f64,
    bytes: Vec<u8>,
    attempt: usize,
}

/// Codec, comparator and search parameters bundled for repeated exports.
#[derive(Debug, Clone)]
pub struct ExportSizer<C = ImageCodec, S = LumaSsim> {
    codec: C,
    comparator: S,
    config: SizerConfig,
}

impl ExportSizer {
    /// Sizer with the built-in codec, luma SSIM and default config.
    pub fn new() -> Self {
        let config = SizerConfig::default();
        Self {
            codec: ImageCodec,
            comparator: LumaSsim::new(config.ssim_max_edge),
            config,
        }
    }

    /// Sizer with the built-in codec and comparator and a custom config.
    pub fn with_config(config: SizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            codec: ImageCodec,
            comparator: LumaSsim::new(config.ssim_max_edge),
            config,
        })
    }
}

impl Default for ExportSizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec, S: SsimComparator> ExportSizer<C, S> {
    pub fn with_parts(codec: C, comparator: S, config: SizerConfig) -> Self {
        Self {
            codec,
            comparator,
            config,
        }
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// See [`size_export`].
    pub async fn size_export(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        preset: &CompressionPreset,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExportResult, ExportError> {
        size_export(
            &self.codec,
            &self.comparator,
            &self.config,
            bitmap,
            format,
            preset,
            cancel,
        )
        .await
    }

    /// Encoded size at a single quality, for live size previews.
    pub async fn estimate_size(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        quality: f64,
    ) -> Result<u64, ExportError> {
        let quality = if format.is_lossless() {
            LOSSLESS_QUALITY
        } else {
            quality
        };
        let bytes = encode_once(&self.codec, bitmap, format, quality, None).await?;
        Ok(bytes.len() as u64)
    }
}

/// Find the highest quality at or below `preset.quality` whose encoding fits
/// `preset.target_size_bytes()`, then score it with SSIM.
///
/// Never issues more than `config.max_iterations` encodes. If no attempt fits,
/// the floor-quality encode is returned with `met_budget = false`. PNG is
/// encoded exactly once and always reports `met_fidelity = true`.
///
/// # Errors
///
/// * [`ExportError::InvalidPreset`] before any encode if the preset is out of range
/// * [`ExportError::EncodeFailure`] as soon as the codec fails or returns no bytes
/// * [`ExportError::Cancelled`] if `cancel` fires before the result is built
#[instrument(
    name = "size_export",
    skip_all,
    fields(
        format = %format,
        width = bitmap.width(),
        height = bitmap.height(),
        target_bytes = preset.target_size_bytes(),
    )
)]
pub async fn size_export<C, S>(
    codec: &C,
    comparator: &S,
    config: &SizerConfig,
    bitmap: &Bitmap,
    format: ExportFormat,
    preset: &CompressionPreset,
    cancel: Option<&CancellationToken>,
) -> Result<ExportResult, ExportError>
where
    C: Codec + ?Sized,
    S: SsimComparator + ?Sized,
{
    preset.validate()?;
    config.validate()?;

    let target = preset.target_size_bytes();

    if format.is_lossless() {
        let bytes = encode_once(codec, bitmap, format, LOSSLESS_QUALITY, cancel).await?;
        ensure_active(cancel)?;

        let size = bytes.len() as u64;
        let met_budget = size <= target;
        info!(size, met_budget, "lossless export");
        if !met_budget {
            warn!(size, target, "lossless export exceeds byte budget");
        }

        return Ok(ExportResult {
            bytes,
            format,
            final_quality: LOSSLESS_QUALITY,
            final_size_bytes: size,
            ssim: None,
            met_budget,
            met_fidelity: true,
            attempts: vec![EncodeAttempt {
                quality: LOSSLESS_QUALITY,
                size_bytes: size,
                ssim: None,
            }],
        });
    }

    let floor = config.floor_quality.min(preset.quality);
    let mut lo = floor;
    let mut hi = preset.quality;
    let mut attempts: Vec<EncodeAttempt> = Vec::new();
    let mut best: Option<Candidate> = None;
    let mut lowest_over: Option<Candidate> = None;

    for iteration in 0..config.max_iterations {
        let quality = (lo + hi) / 2.0;
        let bytes = encode_once(codec, bitmap, format, quality, cancel).await?;
        let size = bytes.len() as u64;

        debug!(iteration, quality, size, lo, hi, "encode attempt");
        attempts.push(EncodeAttempt {
            quality,
            size_bytes: size,
            ssim: None,
        });
        let candidate = Candidate {
            quality,
            bytes,
            attempt: attempts.len() - 1,
        };

        if size > target {
            hi = quality;
            if lowest_over.as_ref().map_or(true, |c| quality < c.quality) {
                lowest_over = Some(candidate);
            }
        } else {
            // Every later fit is at a higher quality, so the latest fit is the best.
            lo = quality;
            best = Some(candidate);
        }

        if hi - lo < config.convergence_window {
            break;
        }
    }

    let chosen = match best {
        Some(candidate) => candidate,
        None => match lowest_over {
            // At the floor only when the preset's ceiling is below the configured floor.
            Some(candidate)
                if candidate.quality <= floor
                    || attempts.len() >= config.max_iterations as usize =>
            {
                candidate
            }
            _ => {
                let bytes = encode_once(codec, bitmap, format, floor, cancel).await?;
                debug!(quality = floor, size = bytes.len(), "floor encode");
                attempts.push(EncodeAttempt {
                    quality: floor,
                    size_bytes: bytes.len() as u64,
                    ssim: None,
                });
                Candidate {
                    quality: floor,
                    bytes,
                    attempt: attempts.len() - 1,
                }
            }
        },
    };

    ensure_active(cancel)?;

    let decoded = codec.decode(&chosen.bytes, format)?;
    let ssim = comparator.compare(bitmap, &decoded)?;
    attempts[chosen.attempt].ssim = Some(ssim);

    let size = chosen.bytes.len() as u64;
    let met_budget = size <= target;
    let met_fidelity = ssim >= preset.ssim_threshold;

    info!(
        quality = chosen.quality,
        size,
        ssim,
        met_budget,
        met_fidelity,
        attempts = attempts.len(),
        "export sized"
    );
    if !met_budget {
        warn!(size, target, "closest achievable encode exceeds byte budget");
    }
    if !met_fidelity {
        warn!(ssim, threshold = preset.ssim_threshold, "export below fidelity floor");
    }

    Ok(ExportResult {
        bytes: chosen.bytes,
        format,
        final_quality: chosen.quality,
        final_size_bytes: size,
        ssim: Some(ssim),
        met_budget,
        met_fidelity,
        attempts,
    })
}

fn ensure_active(cancel: Option<&CancellationToken>) -> Result<(), ExportError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ExportError::Cancelled),
        _ => Ok(()),
    }
}

/// Run one encode, racing it against cancellation. A cancelled encode is
/// dropped mid-flight.
async fn encode_once<C: Codec + ?Sized>(
    codec: &C,
    bitmap: &Bitmap,
    format: ExportFormat,
    quality: f64,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<u8>, ExportError> {
    ensure_active(cancel)?;

    let encode = codec.encode(bitmap, format, quality);
    let bytes = match cancel {
        Some(token) => match select(encode, pin!(token.cancelled())).await {
            Either::Left((result, _)) => result?,
            Either::Right(((), _)) => return Err(ExportError::Cancelled),
        },
        None => encode.await?,
    };

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput(format).into());
    }
    Ok(bytes)
}
