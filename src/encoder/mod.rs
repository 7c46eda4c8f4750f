//! Image re-encoding — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode (JPEG, PNG, WebP)** | `image::load_from_memory` |
//! | **Resize** | Lanczos3, dimensions from [`levels::fit_dimensions`](crate::levels::fit_dimensions) |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Backend**: [`Encoder`] trait + [`EncodeError`]
//! - **Parameters**: [`EncodeParams`] describing one encode call
//! - **RustEncoder**: the production implementation

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{EncodeError, Encoder};
pub use params::{EncodeParams, TargetFormat};
pub use rust_backend::RustEncoder;
