//! The progressive compressor.
//!
//! Walks the ordered level table searching for the first level whose output
//! satisfies that level's size ceiling:
//!
//! ```text
//! validate ─→ short-circuit?  ──────────────────→ Success (bytes unchanged)
//!    │
//!    └→ attempt 0 ─ fits ceiling? ─→ Success
//!           │ no
//!           └→ attempt 1 (re-compresses attempt 0's output)
//!                  │ ...
//!                  └→ exhausted ─→ ExceedsBudget { final_bytes }
//! ```
//!
//! Design properties, all load-bearing:
//!
//! - **First-fit, not best-fit.** The search stops at the first satisfying
//!   level even if a later one would produce a smaller result. Bounded
//!   attempt cost matters more than optimality for a user-facing operation.
//! - **Chaining.** Each attempt re-encodes the previous attempt's output,
//!   so aggressive levels build on prior reduction instead of starting
//!   over. Compounding quality loss across stages is the accepted cost.
//! - **Borrow until consumed.** The caller's input buffer is borrowed; the
//!   pipeline only allocates once an attempt produces output (or for the
//!   short-circuit copy handed back to the caller).
//! - **Failures are values.** A bad input never panics; every terminal
//!   outcome is a [`PipelineError`] variant with enough context to render a
//!   specific remediation message.
//!
//! Attempts are strictly sequential — each depends on the previous output —
//! and each is a single bounded decode/encode, so callers may wrap the whole
//! run in an external timeout without the loop being timeout-aware. The run
//! itself checks a [`CancelToken`] between attempts and reports
//! [`PipelineError::Cancelled`] when a new submission supersedes it.

use crate::encoder::{EncodeError, EncodeParams, Encoder, RustEncoder, TargetFormat};
use crate::levels::{self, CompressionLevel};
use crate::output::human_size;
use crate::validate::{AllowList, UnsupportedFormat, validate};
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Caller-supplied image. Borrowed — the pipeline never copies the content
/// unless it short-circuits or an attempt consumes it.
#[derive(Debug, Clone, Copy)]
pub struct InputImage<'a> {
    pub content: &'a [u8],
    /// Declared media subtype (e.g. `jpeg`), checked against the allow-list.
    pub subtype: &'a str,
}

impl<'a> InputImage<'a> {
    pub fn new(content: &'a [u8], subtype: &'a str) -> Self {
        Self { content, subtype }
    }

    pub fn byte_len(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Output of a successful run. Exactly one artifact is live per invocation;
/// intermediate attempt outputs are dropped as the chain advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    /// Media subtype of the bytes: the target encoding, or the input's own
    /// subtype when compression was skipped.
    pub encoding: String,
}

impl Artifact {
    pub fn byte_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Pipeline run settings: the gate, the level table, and the skip threshold.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub allow: AllowList,
    /// Ordered attempt sequence, least to most aggressive.
    pub levels: Vec<CompressionLevel>,
    /// Inputs at or below this byte length skip compression entirely.
    pub no_op_threshold: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allow: AllowList::default(),
            levels: levels::stock_levels(),
            no_op_threshold: levels::DEFAULT_NO_OP_THRESHOLD,
        }
    }
}

/// Terminal failure of a run. Never a crash — the caller renders these.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Rejected before compression; resubmit with a different file.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFormat),
    /// The encoder could not process the buffer (corrupt data, codec edge
    /// case). Aborts the run; remaining levels are not attempted.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
    /// Every level was tried and none met its ceiling. Carries the last
    /// attempt's actual output size for a precise user message.
    #[error("image is still {} after maximum compression", human_size(*.final_bytes))]
    ExceedsBudget { final_bytes: u64 },
    /// A newer submission superseded this run.
    #[error("compression cancelled")]
    Cancelled,
}

/// Emitted once per attempt, purely observational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptEvent {
    pub label: String,
    /// 0-based position in the level table.
    pub index: usize,
    pub result_bytes: u64,
}

/// Shared cancellation flag. Cloning hands out another handle to the same
/// flag; cancelling is sticky for the lifetime of the token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run the pipeline with the production encoder.
pub fn run(input: InputImage<'_>, config: &PipelineConfig) -> Result<Artifact, PipelineError> {
    let encoder = RustEncoder::new();
    run_with_encoder(&encoder, input, config, None, None)
}

/// Run the pipeline with a specific encoder (allows testing with a mock),
/// optional per-attempt progress events, and optional cancellation.
pub fn run_with_encoder(
    encoder: &impl Encoder,
    input: InputImage<'_>,
    config: &PipelineConfig,
    progress: Option<&Sender<AttemptEvent>>,
    cancel: Option<&CancelToken>,
) -> Result<Artifact, PipelineError> {
    validate(input.subtype, &config.allow)?;

    // Already within budget: hand the original bytes back untouched rather
    // than destructively re-encoding a small input.
    if input.byte_len() <= config.no_op_threshold {
        return Ok(Artifact {
            bytes: input.content.to_vec(),
            encoding: input.subtype.to_lowercase(),
        });
    }

    // Working buffer: borrows the input until the first attempt replaces it.
    let mut current: Cow<'_, [u8]> = Cow::Borrowed(input.content);

    for (index, level) in config.levels.iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(PipelineError::Cancelled);
        }

        let encoded = encoder.encode(
            &current,
            &EncodeParams {
                max_long_edge: level.max_long_edge,
                quality: level.quality,
                format: TargetFormat::Jpeg,
            },
        )?;

        if let Some(tx) = progress {
            // Observer gone is not an error; keep compressing.
            let _ = tx.send(AttemptEvent {
                label: level.label.clone(),
                index,
                result_bytes: encoded.len() as u64,
            });
        }

        // Strict byte comparison against this level's ceiling, no rounding.
        if encoded.len() as u64 <= level.ceiling_bytes {
            return Ok(Artifact {
                bytes: encoded,
                encoding: TargetFormat::Jpeg.subtype().to_string(),
            });
        }

        // Chain: the next attempt re-compresses this output. The previous
        // working buffer is dropped here, keeping one live buffer.
        current = Cow::Owned(encoded);
    }

    Err(PipelineError::ExceedsBudget {
        final_bytes: current.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::backend::tests::MockEncoder;
    use crate::levels::Quality;
    use std::sync::mpsc;

    const MB: u64 = 1024 * 1024;

    fn level(label: &str, ceiling_bytes: u64, max_long_edge: u32, quality: f32) -> CompressionLevel {
        CompressionLevel {
            ceiling_bytes,
            max_long_edge,
            quality: Quality::new(quality),
            label: label.to_string(),
        }
    }

    /// Two-level table: [{4.5MB, 1920px, 0.85}, {1MB, 1000px, 0.45}].
    fn two_level_config() -> PipelineConfig {
        PipelineConfig {
            allow: AllowList::default(),
            levels: vec![
                level("standard", 4_718_592, 1920, 0.85),
                level("maximum", MB, 1000, 0.45),
            ],
            no_op_threshold: 5 * MB,
        }
    }

    #[test]
    fn small_input_short_circuits_unchanged() {
        let bytes = vec![7u8; 50 * 1024]; // 50 KB
        let input = InputImage::new(&bytes, "png");
        let encoder = MockEncoder::shrinking(0.5);

        let artifact =
            run_with_encoder(&encoder, input, &two_level_config(), None, None).unwrap();

        assert_eq!(artifact.bytes, bytes);
        assert_eq!(artifact.encoding, "png");
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn input_exactly_at_threshold_short_circuits() {
        let config = two_level_config();
        let bytes = vec![0u8; config.no_op_threshold as usize];
        let encoder = MockEncoder::shrinking(0.5);

        let artifact =
            run_with_encoder(&encoder, InputImage::new(&bytes, "jpeg"), &config, None, None)
                .unwrap();
        assert_eq!(artifact.byte_len(), config.no_op_threshold);
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn disallowed_subtype_rejected_before_encoder() {
        let bytes = vec![0u8; 8 * MB as usize];
        let encoder = MockEncoder::shrinking(0.5);

        let err = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "gif"),
            &two_level_config(),
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Unsupported(_)));
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn first_fit_stops_at_first_satisfied_ceiling() {
        // 8 MB input, encoder reduces 60% per call: 8MB → 3.2MB ≤ 4.5MB,
        // so level 0 succeeds and level 1 is never attempted.
        let bytes = vec![1u8; 8 * MB as usize];
        let encoder = MockEncoder::shrinking(0.4);

        let artifact = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            None,
        )
        .unwrap();

        assert_eq!(artifact.byte_len(), (8.0 * MB as f64 * 0.4).round() as u64);
        assert_eq!(artifact.encoding, "jpeg");
        assert_eq!(encoder.call_count(), 1);
    }

    #[test]
    fn chaining_feeds_each_attempt_the_previous_output() {
        // Shrink too slowly for level 0 (10MB → 6MB > 4.5MB) so level 1 runs
        // on level 0's output, then fails too (6MB → 3.6MB > 1MB).
        let bytes = vec![0x55u8; 10 * MB as usize];
        let encoder = MockEncoder::shrinking(0.6);

        let err = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            None,
        )
        .unwrap_err();

        let calls = encoder.recorded();
        assert_eq!(calls.len(), 2);
        // First attempt sees the original input
        assert_eq!(calls[0].input_tag, Some(0x55));
        assert_eq!(calls[0].input_len, 10 * MB);
        // Second attempt sees attempt 0's tagged output, not the original
        assert_eq!(calls[1].input_tag, Some(MockEncoder::tag_for(0)));
        assert_eq!(calls[1].input_len, 6 * MB);

        // Exhaustion reports the last attempt's actual output size
        let final_expected = (6.0 * MB as f64 * 0.6).round() as u64;
        match err {
            PipelineError::ExceedsBudget { final_bytes } => {
                assert_eq!(final_bytes, final_expected)
            }
            other => panic!("expected ExceedsBudget, got {other:?}"),
        }
    }

    #[test]
    fn attempts_use_their_levels_parameters() {
        let bytes = vec![0u8; 10 * MB as usize];
        let encoder = MockEncoder::incompressible();

        let _ = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            None,
        );

        let calls = encoder.recorded();
        assert_eq!(calls[0].max_long_edge, 1920);
        assert_eq!(calls[0].quality_percent, 85);
        assert_eq!(calls[1].max_long_edge, 1000);
        assert_eq!(calls[1].quality_percent, 45);
    }

    #[test]
    fn incompressible_input_exhausts_with_final_size() {
        let bytes = vec![0u8; 6 * MB as usize];
        let encoder = MockEncoder::incompressible();

        let err = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            None,
        )
        .unwrap_err();

        match err {
            PipelineError::ExceedsBudget { final_bytes } => assert_eq!(final_bytes, 6 * MB),
            other => panic!("expected ExceedsBudget, got {other:?}"),
        }
        assert_eq!(encoder.call_count(), 2);
    }

    #[test]
    fn encoder_failure_aborts_without_further_attempts() {
        let bytes = vec![0u8; 8 * MB as usize];
        let encoder = MockEncoder::failing_at(0);

        let err = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Encoding(_)));
        assert_eq!(encoder.call_count(), 1);
    }

    #[test]
    fn progress_events_carry_label_index_and_size() {
        let bytes = vec![0u8; 10 * MB as usize];
        let encoder = MockEncoder::shrinking(0.6);
        let (tx, rx) = mpsc::channel();

        let _ = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            Some(&tx),
            None,
        );
        drop(tx);

        let events: Vec<AttemptEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "standard");
        assert_eq!(events[0].index, 0);
        assert_eq!(events[0].result_bytes, 6 * MB);
        assert_eq!(events[1].label, "maximum");
        assert_eq!(events[1].index, 1);
    }

    #[test]
    fn no_events_on_short_circuit() {
        let bytes = vec![0u8; 1024];
        let encoder = MockEncoder::shrinking(0.5);
        let (tx, rx) = mpsc::channel();

        run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            Some(&tx),
            None,
        )
        .unwrap();
        drop(tx);

        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn cancelled_token_stops_before_any_attempt() {
        let bytes = vec![0u8; 8 * MB as usize];
        let encoder = MockEncoder::shrinking(0.5);
        let token = CancelToken::new();
        token.cancel();

        let err = run_with_encoder(
            &encoder,
            InputImage::new(&bytes, "jpeg"),
            &two_level_config(),
            None,
            Some(&token),
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn cancel_token_clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn exceeds_budget_message_uses_human_size() {
        let err = PipelineError::ExceedsBudget {
            final_bytes: 6 * MB,
        };
        assert_eq!(
            err.to_string(),
            "image is still 6.00 MB after maximum compression"
        );
    }

    #[test]
    fn default_config_uses_stock_table() {
        let config = PipelineConfig::default();
        assert_eq!(config.levels.len(), 3);
        assert_eq!(config.no_op_threshold, 5 * MB);
        assert!(crate::levels::ceilings_monotonic(&config.levels));
    }
}
