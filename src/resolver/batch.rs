//! Fetch batch types: the per-request list of stickers to download.

use std::path::{Path, PathBuf};

use crate::parser::PackIdentifier;
use crate::telegram::{ANIMATED_STICKER_MIME, DocumentItem};

/// Coarse media classification driving the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeKind {
    /// Lottie animation (`application/x-tgsticker`).
    Animated,
    /// Any `video/*` type.
    Video,
    /// Everything else, including unknown types.
    Static,
}

impl MimeKind {
    /// Classifies a declared MIME type.
    ///
    /// Exact `application/x-tgsticker` is animated, any `video/` prefix is
    /// video, and anything else falls back to static.
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type == ANIMATED_STICKER_MIME {
            Self::Animated
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Static
        }
    }

    /// File extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Animated => ".tgs",
            Self::Video => ".webm",
            Self::Static => ".webp",
        }
    }
}

/// One sticker of a pack.
#[derive(Debug, Clone)]
pub struct AssetItem {
    /// 1-based position within the pack.
    pub index: usize,
    /// Media kind, fixed at batch construction.
    pub kind: MimeKind,
    /// Remote handle.
    pub document: DocumentItem,
    /// Set only after a successful fetch; `None` excludes the item from the archive.
    pub local_path: Option<PathBuf>,
}

impl AssetItem {
    /// Output filename: `{packId}_{index}{ext}`.
    #[must_use]
    pub fn file_name(&self, pack_id: &PackIdentifier) -> String {
        format!("{pack_id}_{}{}", self.index, self.kind.extension())
    }
}

/// Ordered stickers of one pack, owned by a single request.
#[derive(Debug, Clone)]
pub struct FetchBatch {
    pack_id: PackIdentifier,
    items: Vec<AssetItem>,
}

impl FetchBatch {
    /// Builds a batch from remote documents, numbering items from 1.
    #[must_use]
    pub fn from_documents(pack_id: PackIdentifier, documents: Vec<DocumentItem>) -> Self {
        let items = documents
            .into_iter()
            .enumerate()
            .map(|(i, document)| AssetItem {
                index: i + 1,
                kind: MimeKind::from_mime(&document.mime_type),
                document,
                local_path: None,
            })
            .collect();
        Self { pack_id, items }
    }

    /// Pack this batch belongs to.
    #[must_use]
    pub fn pack_id(&self) -> &PackIdentifier {
        &self.pack_id
    }

    /// Items in pack order.
    #[must_use]
    pub fn items(&self) -> &[AssetItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [AssetItem] {
        &mut self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the batch has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Paths of successfully fetched items, in pack order.
    pub fn fetched_paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().filter_map(|i| i.local_path.as_deref())
    }

    /// Number of successfully fetched items.
    #[must_use]
    pub fn fetched_count(&self) -> usize {
        self.fetched_paths().count()
    }
}
