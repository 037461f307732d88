//! Per-request workspace on disk.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::parser::PackIdentifier;

/// Owns `{root}/{pack}/` and `{root}/{pack}.zip` for one request.
///
/// The guard exists before anything is written, and both paths are removed
/// exactly once: by [`cleanup`](Self::cleanup) or, failing that, on drop.
/// Removal errors are logged and never returned.
#[derive(Debug)]
pub struct WorkspaceGuard {
    pack_dir: PathBuf,
    archive_path: PathBuf,
    cleaned: bool,
}

impl WorkspaceGuard {
    /// Prepares a fresh pack directory under `root`.
    ///
    /// A directory left behind by an earlier request for the same pack is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory cannot be created; anything
    /// already created is removed when the guard drops.
    pub async fn prepare(root: &Path, pack_id: &PackIdentifier) -> Result<Self, io::Error> {
        let guard = Self {
            pack_dir: root.join(pack_id.as_str()),
            archive_path: root.join(format!("{pack_id}.zip")),
            cleaned: false,
        };

        match tokio::fs::remove_dir_all(&guard.pack_dir).await {
            Ok(()) => debug!(path = %guard.pack_dir.display(), "removed stale pack directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tokio::fs::create_dir_all(&guard.pack_dir).await?;
        Ok(guard)
    }

    /// Directory the stickers are downloaded into.
    #[must_use]
    pub fn pack_dir(&self) -> &Path {
        &self.pack_dir
    }

    /// Location of the archive.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Removes the pack directory and the archive without blocking the runtime.
    pub async fn cleanup(mut self) {
        self.cleaned = true;

        if let Err(e) = tokio::fs::remove_dir_all(&self.pack_dir).await
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.pack_dir.display(), error = %e, "failed to remove pack directory");
        }
        if let Err(e) = tokio::fs::remove_file(&self.archive_path).await
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.archive_path.display(), error = %e, "failed to remove archive");
        }
        debug!(path = %self.pack_dir.display(), "workspace cleaned up");
    }

    // Synchronous fallback for guards dropped without `cleanup`.
    fn remove_all(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        if let Err(e) = std::fs::remove_dir_all(&self.pack_dir)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.pack_dir.display(), error = %e, "failed to remove pack directory");
        }
        if let Err(e) = std::fs::remove_file(&self.archive_path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.archive_path.display(), error = %e, "failed to remove archive");
        }
        debug!(path = %self.pack_dir.display(), "workspace cleaned up");
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        self.remove_all();
    }
}
