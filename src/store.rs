//! Filesystem-backed attachment store.

use crate::core::AttachmentStore;
use async_trait::async_trait;
use tracing::warn;

/// Resolves attachment locators as filesystem paths.
pub struct FsAttachmentStore;

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn exists(&self, locator: &str) -> bool {
        match tokio::fs::try_exists(locator).await {
            Ok(present) => present,
            Err(e) => {
                // An unreadable path is treated the same as a missing one;
                // the dispatcher degrades that attachment.
                warn!(locator, error = %e, "Failed to check attachment existence");
                false
            }
        }
    }
}
