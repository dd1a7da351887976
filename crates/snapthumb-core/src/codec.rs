//! The codec seam used by the sizer.
//!
//! Encoding is async so a host can move each attempt off the main thread
//! (a Web Worker, a blocking pool). The built-in [`ImageCodec`] runs the
//! pure-Rust encoders inline.

use async_trait::async_trait;

use crate::bitmap::Bitmap;
use crate::decode::{decode_bitmap, DecodeError};
use crate::encode::{self, EncodeError};
use crate::format::ExportFormat;

/// Encoder/decoder pair the export sizer drives.
///
/// `encode` must be deterministic for fixed inputs and must report a zero-byte
/// result as an error rather than returning an empty buffer.
#[async_trait]
pub trait Codec: Send + Sync {
    /// Encode `bitmap` at a normalized `quality` in (0, 1].
    async fn encode(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        quality: f64,
    ) -> Result<Vec<u8>, EncodeError>;

    /// Decode bytes previously produced by [`Codec::encode`].
    fn decode(&self, bytes: &[u8], format: ExportFormat) -> Result<Bitmap, DecodeError>;
}

/// Codec backed by the `image` crate encoders in [`crate::encode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

#[async_trait]
impl Codec for ImageCodec {
    async fn encode(
        &self,
        bitmap: &Bitmap,
        format: ExportFormat,
        quality: f64,
    ) -> Result<Vec<u8>, EncodeError> {
        encode::encode(bitmap, format, quality)
    }

    fn decode(&self, bytes: &[u8], format: ExportFormat) -> Result<Bitmap, DecodeError> {
        decode_bitmap(bytes, format)
    }
}
