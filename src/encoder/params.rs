//! Parameter types for encode operations.
//!
//! [`EncodeParams`] describes *what* one attempt should do — target edge,
//! quality, output format — and is the interface between the
//! [`pipeline`](crate::pipeline) (which walks the level table) and the
//! [`Encoder`](super::Encoder) (which does the pixel work). Separating the
//! two allows swapping the encoder for a recording mock in tests without
//! touching attempt-loop logic.

use crate::levels::Quality;

/// The fixed output encoding. The pipeline performs no format conversion
/// beyond this single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    #[default]
    Jpeg,
}

impl TargetFormat {
    /// Media subtype string for reports and artifact metadata.
    pub fn subtype(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpeg",
        }
    }
}

/// Full specification of one re-encode call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    /// Cap on the output's longer edge, in pixels.
    pub max_long_edge: u32,
    pub quality: Quality,
    pub format: TargetFormat,
}
