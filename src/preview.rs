//! Preview resource handles and the one-slot upload lifecycle.
//!
//! The surrounding application renders a preview of the current artifact.
//! That preview is an explicit acquire/release pair here — never ambient
//! state — so the invariant "at most one live preview per upload slot"
//! is enforced by ownership instead of caller discipline:
//!
//! - [`PreviewHandle`] owns one on-disk preview file and removes it on
//!   [`release`](PreviewHandle::release) (or best-effort on drop).
//! - [`UploadSlot`] holds at most one handle plus the in-flight run's
//!   [`CancelToken`]. Starting a new submission cancels the prior run and
//!   releases the prior preview before anything new is created, so handles
//!   cannot accumulate across resubmissions.

use crate::pipeline::{Artifact, CancelToken};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An owned, renderable copy of one artifact on disk.
///
/// Created via [`PreviewHandle::install`], which writes the artifact bytes
/// to the given path. The file lives exactly as long as the handle.
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
}

impl PreviewHandle {
    /// Write the artifact to `path` and take ownership of the file.
    pub fn install(artifact: &Artifact, path: &Path) -> io::Result<Self> {
        fs::write(path, &artifact.bytes)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the preview file, consuming the handle.
    pub fn release(self) -> io::Result<()> {
        let result = fs::remove_file(&self.path);
        // Drop must not remove twice
        std::mem::forget(self);
        result
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        // Best effort; explicit release() reports errors
        let _ = fs::remove_file(&self.path);
    }
}

/// One logical upload slot: at most one in-flight run and one live preview.
#[derive(Debug, Default)]
pub struct UploadSlot {
    preview: Option<PreviewHandle>,
    in_flight: Option<CancelToken>,
}

impl UploadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new submission: cancel any in-flight run, release any live
    /// preview, and hand back the token the new run should watch.
    pub fn begin(&mut self) -> CancelToken {
        if let Some(prior) = self.in_flight.take() {
            prior.cancel();
        }
        self.reset();
        let token = CancelToken::new();
        self.in_flight = Some(token.clone());
        token
    }

    /// Install the finished run's artifact as the slot's preview.
    ///
    /// Replacing releases the previous preview first, keeping exactly one
    /// live handle.
    pub fn install(&mut self, artifact: &Artifact, path: &Path) -> io::Result<&Path> {
        self.preview = None; // release before replacement
        let handle = PreviewHandle::install(artifact, path)?;
        self.in_flight = None;
        Ok(self.preview.insert(handle).path())
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.as_ref().map(PreviewHandle::path)
    }

    /// Clear the slot: cancel any in-flight run and release the preview.
    pub fn reset(&mut self) {
        if let Some(prior) = self.in_flight.take() {
            prior.cancel();
        }
        self.preview = None;
    }
}
