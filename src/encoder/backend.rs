//! Encoder trait and shared error type.
//!
//! The [`Encoder`] trait is the single capability the pipeline consumes:
//! given an image buffer and an [`EncodeParams`], produce a re-encoded
//! buffer or fail. The production implementation is
//! [`RustEncoder`](super::rust_backend::RustEncoder) — pure Rust,
//! statically linked, deterministic for a given input within one runtime.

use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Re-encode an image buffer according to the given parameters.
///
/// Implementations must be deterministic for a given input + parameters
/// within one runtime, and must treat the input as read-only.
pub trait Encoder: Sync {
    fn encode(&self, buffer: &[u8], params: &EncodeParams) -> Result<Vec<u8>, EncodeError>;
}
