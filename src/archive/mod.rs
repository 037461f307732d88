//! Zip archiving of fetched stickers.
//!
//! Only items that were fetched are included. Entries are flat (the base
//! filename, no directories) and deflate-compressed. Zip writing is
//! synchronous, so it runs on the blocking pool.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::resolver::FetchBatch;

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    /// Location of the zip file.
    pub path: PathBuf,
    /// Number of entries.
    pub item_count: usize,
    /// Size of the zip file in bytes.
    pub byte_size: u64,
}

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No item of the batch was fetched.
    #[error("no stickers were downloaded")]
    Empty,

    /// The archive is absent or zero bytes after writing.
    #[error("archive missing or empty: {path}")]
    Missing {
        /// Expected archive location.
        path: PathBuf,
    },

    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Zip encoder error.
    #[error("zip error at {path}: {source}")]
    Zip {
        /// Archive being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The blocking archive task panicked or was cancelled.
    #[error("archive task failed: {0}")]
    Join(String),
}

impl ArchiveError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Zip {
            path: path.into(),
            source,
        }
    }
}

/// Bundles every fetched item of `batch` into a zip at `dest`.
///
/// # Errors
///
/// Returns [`ArchiveError::Empty`] if nothing was fetched, and
/// [`ArchiveError::Missing`] if the written file is absent or zero bytes.
/// On any error the partial archive is removed.
#[instrument(skip(batch), fields(pack = %batch.pack_id(), dest = %dest.display()))]
pub async fn archive(batch: &FetchBatch, dest: &Path) -> Result<ArchiveResult, ArchiveError> {
    let sources: Vec<PathBuf> = batch.fetched_paths().map(Path::to_path_buf).collect();
    if sources.is_empty() {
        debug!("nothing fetched, skipping archive");
        return Err(ArchiveError::Empty);
    }

    let dest = dest.to_path_buf();
    let task_dest = dest.clone();
    let result = tokio::task::spawn_blocking(move || write_archive(&sources, &task_dest))
        .await
        .map_err(|e| ArchiveError::Join(e.to_string()))
        .and_then(|r| r);

    match result {
        Ok(archive) => {
            info!(
                entries = archive.item_count,
                bytes = archive.byte_size,
                "archive created"
            );
            Ok(archive)
        }
        Err(e) => {
            remove_partial(&dest);
            Err(e)
        }
    }
}

fn write_archive(sources: &[PathBuf], dest: &Path) -> Result<ArchiveResult, ArchiveError> {
    let file = File::create(dest).map_err(|e| ArchiveError::io(dest, e))?;
    let mut zip = ZipWriter::new(file);
    let mut item_count = 0;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for source in sources {
        let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %source.display(), "skipping file with unusable name");
            continue;
        };
        let mut input = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
        zip.start_file(name, options)
            .map_err(|e| ArchiveError::zip(dest, e))?;
        io::copy(&mut input, &mut zip).map_err(|e| ArchiveError::io(source, e))?;
        item_count += 1;
    }

    zip.finish().map_err(|e| ArchiveError::zip(dest, e))?;

    let byte_size = std::fs::metadata(dest).map_or(0, |meta| meta.len());
    if item_count == 0 || byte_size == 0 {
        return Err(ArchiveError::Missing {
            path: dest.to_path_buf(),
        });
    }

    Ok(ArchiveResult {
        path: dest.to_path_buf(),
        item_count,
        byte_size,
    })
}

fn remove_partial(dest: &Path) {
    match std::fs::remove_file(dest) {
        Ok(()) => debug!(path = %dest.display(), "removed partial archive"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %dest.display(), error = %e, "failed to remove partial archive"),
    }
}
