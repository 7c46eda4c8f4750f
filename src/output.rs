//! CLI output formatting and the machine-readable report.
//!
//! Each piece of output has a pure `format_*` function (returns strings,
//! no I/O) and the CLI composes them; this keeps formatting testable the
//! same way the attempt loop is.
//!
//! # Size display
//!
//! [`human_size`] renders byte counts for humans: at or above 1 MiB in MB,
//! otherwise in KB, two decimals, with `0 Bytes` as the degenerate case.
//! Display only — every comparison in the pipeline operates on raw byte
//! counts.

use crate::pipeline::{Artifact, AttemptEvent};
use serde::Serialize;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Format a byte count for display: `≥1 MiB → "N.NN MB"`, else `"N.NN KB"`.
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mb = bytes as f64 / MIB;
    if mb >= 1.0 {
        format!("{mb:.2} MB")
    } else {
        format!("{:.2} KB", bytes as f64 / KIB)
    }
}

/// One line per compression attempt, printed as events arrive.
///
/// ```text
/// attempt 1 (standard): 3.20 MB
/// ```
pub fn format_attempt_event(event: &AttemptEvent) -> String {
    format!(
        "attempt {} ({}): {}",
        event.index + 1,
        event.label,
        human_size(event.result_bytes)
    )
}

/// Success summary with the reduction percentage. Skips the reduction line
/// when nothing changed (short-circuit).
pub fn format_success(original_bytes: u64, artifact: &Artifact) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        human_size(artifact.byte_len()),
        artifact.encoding
    )];
    if artifact.byte_len() != original_bytes && original_bytes > 0 {
        let reduction = (1.0 - artifact.byte_len() as f64 / original_bytes as f64) * 100.0;
        lines.push(format!(
            "original: {}, reduction: {:.0}%",
            human_size(original_bytes),
            reduction
        ));
    }
    lines
}

/// Machine-readable run report for `--json`.
#[derive(Debug, Serialize)]
pub struct CompressReport {
    pub original_bytes: u64,
    pub final_bytes: u64,
    pub encoding: String,
    /// True when the input was already within budget and passed through.
    pub short_circuited: bool,
    pub attempts: Vec<AttemptReport>,
}

#[derive(Debug, Serialize)]
pub struct AttemptReport {
    pub label: String,
    pub index: usize,
    pub result_bytes: u64,
}

impl CompressReport {
    pub fn new(original_bytes: u64, artifact: &Artifact, attempts: &[AttemptEvent]) -> Self {
        Self {
            original_bytes,
            final_bytes: artifact.byte_len(),
            encoding: artifact.encoding.clone(),
            short_circuited: attempts.is_empty(),
            attempts: attempts
                .iter()
                .map(|e| AttemptReport {
                    label: e.label.clone(),
                    index: e.index,
                    result_bytes: e.result_bytes,
                })
                .collect(),
        }
    }
}
