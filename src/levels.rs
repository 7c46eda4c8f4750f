//! Compression levels and pure dimension math.
//!
//! A [`CompressionLevel`] is one step of the attempt sequence: a size ceiling,
//! a maximum long-edge dimension, and an encoding quality, plus a label for
//! progress reporting. The sequence is ordered from least to most aggressive —
//! ceilings must be monotonically non-increasing, which [`ceilings_monotonic`]
//! checks and config validation enforces.
//!
//! Everything here is pure and testable without touching pixels.

/// Quality setting for lossy encoding, on a 0.0–1.0 scale.
///
/// Clamped on construction. The JPEG encoder maps this to its 1–100 scale
/// at the encode site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// The 1–100 integer scale JPEG encoders expect.
    pub fn as_percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// One step in the ordered attempt sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionLevel {
    /// Maximum acceptable output size in bytes for this attempt.
    pub ceiling_bytes: u64,
    /// Maximum long-edge dimension in pixels. Smaller images pass through
    /// unresized.
    pub max_long_edge: u32,
    pub quality: Quality,
    /// Human-readable stage label for progress reporting.
    pub label: String,
}

/// Inputs at or below this size skip compression entirely (see
/// [`pipeline::run`](crate::pipeline::run)).
pub const DEFAULT_NO_OP_THRESHOLD: u64 = 5 * 1024 * 1024;

/// The stock three-level sequence.
///
/// The first level keeps the classic upload-widget margin: a 4.5 MB ceiling
/// under a 5 MiB threshold, quality 0.8. Later levels tighten ceiling,
/// resolution, and quality together.
pub fn stock_levels() -> Vec<CompressionLevel> {
    vec![
        CompressionLevel {
            ceiling_bytes: 4_500_000,
            max_long_edge: 1920,
            quality: Quality::new(0.8),
            label: "standard".to_string(),
        },
        CompressionLevel {
            ceiling_bytes: 2_000_000,
            max_long_edge: 1280,
            quality: Quality::new(0.6),
            label: "aggressive".to_string(),
        },
        CompressionLevel {
            ceiling_bytes: 1_000_000,
            max_long_edge: 1000,
            quality: Quality::new(0.45),
            label: "maximum".to_string(),
        },
    ]
}

/// Check that ceilings never increase across the sequence.
pub fn ceilings_monotonic(levels: &[CompressionLevel]) -> bool {
    levels
        .windows(2)
        .all(|pair| pair[1].ceiling_bytes <= pair[0].ceiling_bytes)
}

/// Calculate output dimensions that fit within a maximum long edge,
/// preserving aspect ratio.
///
/// Returns the source dimensions unchanged when the long edge is already
/// within bounds — upscaling is never useful for size reduction.
///
/// # Examples
/// ```
/// # use snapfit::levels::fit_dimensions;
/// // 4000x3000 landscape capped at 1920 → 1920x1440
/// assert_eq!(fit_dimensions((4000, 3000), 1920), (1920, 1440));
///
/// // already small enough → unchanged
/// assert_eq!(fit_dimensions((800, 600), 1920), (800, 600));
/// ```
pub fn fit_dimensions(source: (u32, u32), max_long_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let longer = src_w.max(src_h);

    if longer <= max_long_edge {
        return source;
    }

    let ratio = max_long_edge as f64 / longer as f64;
    if src_w >= src_h {
        // Landscape or square: width is the long edge
        (max_long_edge, (src_h as f64 * ratio).round().max(1.0) as u32)
    } else {
        ((src_w as f64 * ratio).round().max(1.0) as u32, max_long_edge)
    }
}
