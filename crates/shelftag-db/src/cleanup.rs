//! # Best-Effort File Cleanup
//!
//! Removing a product's image or a temporary raster file must never fail the
//! operation that triggered it. Every removal goes through [`FileRemover`] so
//! tests can check that a removal was attempted without touching the disk.
//!
//! ```text
//! delete product ──► DELETE row ──► remove_best_effort(image_path)
//!                         │                 │
//!                     (result)          Ok / NotFound → debug!
//!                                       other error  → warn!, swallowed
//! ```

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Something that can delete a file.
pub trait FileRemover: Send + Sync + Debug {
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Removes files from the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Attempts a removal, logs the outcome, never propagates.
///
/// Returns `true` when the file was actually removed.
pub fn remove_best_effort(remover: &dyn FileRemover, path: &Path, what: &str) -> bool {
    match remover.remove(path) {
        Ok(()) => {
            debug!(path = %path.display(), what, "Removed file");
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), what, "File already gone");
            false
        }
        Err(e) => {
            warn!(path = %path.display(), what, error = %e, "Could not remove file");
            false
        }
    }
}

/// Records every requested removal instead of deleting anything.
///
/// Can be told to fail so callers' "never propagate" paths are exercised.
#[derive(Debug, Default)]
pub struct RecordingRemover {
    attempts: Mutex<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingRemover {
    pub fn new() -> Self {
        RecordingRemover::default()
    }

    /// A remover whose every attempt fails with `PermissionDenied`.
    pub fn failing() -> Self {
        RecordingRemover {
            attempts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Paths passed to `remove`, in call order.
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }
}

impl FileRemover for RecordingRemover {
    fn remove(&self, path: &Path) -> io::Result<()> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(path.to_path_buf());
        }
        if self.fail {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "removal refused"))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
