//! Archive delivery and workspace lifecycle.

mod locks;
mod workspace;

pub use locks::{PackLease, PackLocks};
pub use workspace::WorkspaceGuard;

use std::path::Path;

use tracing::{info, instrument};

use crate::telegram::{ApiError, ChatApi, ChatId};

/// Caption attached to a delivered archive.
#[must_use]
pub fn caption(pack_name: &str, item_count: usize) -> String {
    format!("Sticker pack: {pack_name}\nTotal stickers: {item_count}")
}

/// Sends the archive at `path` to `chat`.
///
/// # Errors
///
/// Returns [`ApiError`] if the upload fails.
#[instrument(skip(api, caption), fields(path = %path.display()))]
pub async fn deliver(
    api: &dyn ChatApi,
    chat: ChatId,
    path: &Path,
    caption: &str,
) -> Result<(), ApiError> {
    api.send_document(chat, path, caption).await?;
    info!("archive delivered");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::telegram::fake::FakeChatApi;

    #[test]
    fn test_caption_format() {
        assert_eq!(caption("Animals", 10), "Sticker pack: Animals\nTotal stickers: 10");
    }

    #[tokio::test]
    async fn test_deliver_sends_document_with_caption() {
        let api = FakeChatApi::default();
        deliver(&api, ChatId(3), Path::new("/w/Animals.zip"), "cap").await.unwrap();
        assert_eq!(
            api.sent_documents(),
            [(PathBuf::from("/w/Animals.zip"), "cap".to_string())]
        );
    }

    #[tokio::test]
    async fn test_deliver_propagates_upload_failure() {
        let api = FakeChatApi {
            fail_send_document: true,
            ..FakeChatApi::default()
        };
        let err = deliver(&api, ChatId(3), Path::new("/w/Animals.zip"), "cap")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { code: 413, .. }));
    }
}
