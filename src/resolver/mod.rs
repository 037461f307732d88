//! Sticker set resolution.
//!
//! Looks a [`PackIdentifier`] up through the injected [`ChatApi`] and turns
//! the set into an ordered [`FetchBatch`], classifying each item by media
//! kind exactly once.
//!
//! # Example
//!
//! ```no_run
//! use stickerbot_core::parser::PackIdentifier;
//! use stickerbot_core::resolver::{Resolution, resolve};
//! use stickerbot_core::telegram::ChatApi;
//!
//! # async fn example(api: &dyn ChatApi) -> Result<(), Box<dyn std::error::Error>> {
//! let id = PackIdentifier::new("Animals")?;
//! match resolve(api, &id).await {
//!     Resolution::Found(batch) => println!("{} stickers", batch.len()),
//!     Resolution::NotFound | Resolution::Empty => println!("nothing to fetch"),
//! }
//! # Ok(())
//! # }
//! ```

mod batch;

pub use batch::{AssetItem, FetchBatch, MimeKind};

use tracing::{debug, info, instrument, warn};

use crate::parser::PackIdentifier;
use crate::telegram::ChatApi;

/// Outcome of looking up a sticker set.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Set exists and has at least one item.
    Found(FetchBatch),
    /// The platform has no such set, or the lookup failed.
    NotFound,
    /// Set exists but contains no items.
    Empty,
}

/// Resolves `id` into a [`FetchBatch`].
///
/// Lookup errors are not escalated: they are logged and reported as
/// [`Resolution::NotFound`], which callers surface to the user.
#[instrument(skip(api), fields(pack = %id))]
pub async fn resolve(api: &dyn ChatApi, id: &PackIdentifier) -> Resolution {
    let set = match api.sticker_set(id.as_str()).await {
        Ok(Some(set)) => set,
        Ok(None) => {
            debug!("sticker set not found");
            return Resolution::NotFound;
        }
        Err(e) => {
            warn!(error = %e, "sticker set lookup failed");
            return Resolution::NotFound;
        }
    };

    if set.documents.is_empty() {
        debug!("sticker set is empty");
        return Resolution::Empty;
    }

    let batch = FetchBatch::from_documents(id.clone(), set.documents);
    info!(
        items = batch.len(),
        title = %set.title,
        "resolved sticker set"
    );
    Resolution::Found(batch)
}
