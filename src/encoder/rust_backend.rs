//! Pure Rust encoder backend — zero external dependencies.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory` (pure Rust decoders) |
//! | Resize | `image::imageops` Lanczos3, target from [`fit_dimensions`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` via an in-memory cursor |
//!
//! JPEG has no alpha channel, so decoded frames are flattened to RGB8
//! before encoding; the alpha channel is discarded. Acceptable for
//! photographs, which is what a size-budgeted upload path sees.

use super::backend::{EncodeError, Encoder};
use super::params::{EncodeParams, TargetFormat};
use crate::levels::fit_dimensions;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::io::Cursor;

/// Pure Rust encoder using the `image` crate.
///
/// Decodes whatever the compiled-in decoders accept (format sniffed from
/// the bytes, not from the declared subtype), resizes to fit the attempt's
/// long-edge cap, and re-encodes at the attempt's quality.
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resize to fit within the long-edge cap. No-op when already within bounds.
fn fit(img: DynamicImage, max_long_edge: u32) -> DynamicImage {
    let source = (img.width(), img.height());
    let (w, h) = fit_dimensions(source, max_long_edge);
    if (w, h) == source {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    }
}

fn encode_jpeg(img: &DynamicImage, quality_percent: u8) -> Result<Vec<u8>, EncodeError> {
    let rgb = img.to_rgb8();
    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, quality_percent)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| EncodeError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(cursor.into_inner())
}

impl Encoder for RustEncoder {
    fn encode(&self, buffer: &[u8], params: &EncodeParams) -> Result<Vec<u8>, EncodeError> {
        let img = image::load_from_memory(buffer)
            .map_err(|e| EncodeError::Decode(format!("failed to decode image: {e}")))?;

        let fitted = fit(img, params.max_long_edge);

        match params.format {
            TargetFormat::Jpeg => encode_jpeg(&fitted, params.quality.as_percent()),
        }
    }
}
