//! Input format gate.
//!
//! Rejects unsupported media types before any compression cost is paid.
//! The check is a pure predicate over the *declared* subtype — it never
//! inspects bytes and never touches the encoder. Corrupt data declared as
//! an allowed type passes the gate and surfaces later as an encoding error.

use thiserror::Error;

/// Declared subtype is not in the allow-list. Fatal to the invocation; the
/// caller must resubmit with a different file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported format \"{declared}\" — allowed: {allowed}")]
pub struct UnsupportedFormat {
    /// The subtype the caller declared (e.g. `gif`).
    pub declared: String,
    /// Comma-joined allow-list, for the user-facing message.
    pub allowed: String,
}

/// Subtypes accepted by default: the raster formats with decoders compiled in.
pub const DEFAULT_ALLOWED: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// The set of media subtypes allowed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList(Vec<String>);

impl AllowList {
    pub fn new(subtypes: impl IntoIterator<Item = String>) -> Self {
        Self(subtypes.into_iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn contains(&self, subtype: &str) -> bool {
        self.0.iter().any(|s| s.eq_ignore_ascii_case(subtype))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED.iter().map(|s| s.to_string()))
    }
}

/// Extract the subtype from a media type, if prefixed: `image/jpeg` → `jpeg`.
/// Bare subtypes pass through unchanged.
pub fn subtype_of(media_type: &str) -> &str {
    media_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(media_type)
}

/// Gate entry to the pipeline.
///
/// Success guarantees downstream stages only see allow-listed subtypes.
/// No constraint on byte length at this stage.
pub fn validate(declared_subtype: &str, allow: &AllowList) -> Result<(), UnsupportedFormat> {
    if allow.contains(declared_subtype) {
        Ok(())
    } else {
        Err(UnsupportedFormat {
            declared: declared_subtype.to_string(),
            allowed: allow.joined(),
        })
    }
}
