//! # snapfit
//!
//! Compress an arbitrary image file down to a byte budget while keeping it
//! visually useful. The search is a fixed, ordered table of compression
//! levels — each a size-ceiling / max-edge / quality triple — walked
//! first-fit: the run stops at the first level whose output fits that
//! level's ceiling, and each attempt re-compresses the previous attempt's
//! output rather than starting over.
//!
//! ```text
//! validate → short-circuit? → attempt 0 → attempt 1 → ... → artifact
//!                                                       └→ exceeds budget
//! ```
//!
//! When no level satisfies its ceiling the run reports exhaustion with the
//! final achieved size; a budget violation is always a reported failure,
//! never a silently-substituted oversized artifact.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`validate`] | Format gate — allow-listed media subtypes only, checked before any pixel work |
//! | [`levels`] | Compression levels, quality scale, stock attempt table, pure dimension math |
//! | [`encoder`] | The single external capability: re-encode a buffer at a given edge cap and quality |
//! | [`pipeline`] | The progressive compressor — short-circuit, chained attempts, failure taxonomy, cancellation |
//! | [`preview`] | Preview handles and the one-slot upload lifecycle (explicit create/release pairs) |
//! | [`config`] | `snapfit.toml` loading, validation, and the stock config |
//! | [`output`] | Human-readable sizes, attempt/summary lines, the JSON report |
//!
//! # Design Decisions
//!
//! ## Fixed table, not adaptive search
//!
//! The level table is static and finite — no binary search over quality.
//! This trades optimality for a predictable worst-case attempt count,
//! which is the right contract for an operation a user is waiting on.
//!
//! ## JPEG-only output
//!
//! Every re-encode targets JPEG. A size-budgeted upload path sees
//! photographs; a single lossy target keeps the level table meaningful
//! (quality means one thing) and the output pipeline simple. Inputs small
//! enough to skip compression pass through in their original format.
//!
//! ## Pure-Rust imaging
//!
//! Pixel work uses the `image` crate only — no ImageMagick, no libvips,
//! no system dependencies. The binary is fully self-contained.

pub mod config;
pub mod encoder;
pub mod levels;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod validate;

pub use pipeline::{
    Artifact, AttemptEvent, CancelToken, InputImage, PipelineConfig, PipelineError, run,
    run_with_encoder,
};
