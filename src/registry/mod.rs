//! Registry Module
//!
//! Capped, newest-first list of uploaded asset identifiers.

mod page;


use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::store::SharedStore;

pub use page::{PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Store key holding the upload list.
pub const UPLOADS_KEY: &str = "uploads:list";

/// Default cap on stored identifiers.
pub const DEFAULT_MAX_STORED: usize = 100;

// == Upload Registry ==
#[derive(Clone)]
pub struct UploadRegistry {
    store: SharedStore,
    max_stored: usize,
}

impl UploadRegistry {
    /// Creates a registry capped at `max_stored` entries (at least one).
    pub fn new(store: SharedStore, max_stored: usize) -> Self {
        Self {
            store,
            max_stored: max_stored.max(1),
        }
    }

    // == Record Upload ==
    /// Pushes `id` at the head of the list and drops whatever falls past the cap.
    ///
    /// Empty identifiers are rejected before the store is touched. Duplicates
    /// are kept as separate entries.
    pub async fn record_upload(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(RegistryError::InvalidRequest(
                "Missing or invalid publicId".to_string(),
            ));
        }

        let len = self
            .store
            .push_capped(UPLOADS_KEY, id, self.max_stored)
            .await?;
        info!("Recorded upload {} ({} stored)", id, len);
        Ok(())
    }

    // == List Uploads ==
    /// Returns one page of identifiers, newest first.
    ///
    /// A page shorter than `limit` means there is nothing further.
    pub async fn list_uploads(&self, page: PageRequest) -> Result<Vec<String>> {
        let Some((start, stop)) = page.range() else {
            return Ok(Vec::new());
        };

        let items = self.store.lrange(UPLOADS_KEY, start, stop).await?;
        debug!(
            "Listed {} uploads (offset {}, limit {})",
            items.len(),
            page.offset,
            page.limit
        );
        Ok(items)
    }
}
