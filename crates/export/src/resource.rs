//! Temporary object URLs bridging a serialized document to the rasterizer.
//!
//! A document is registered under an opaque `blob:` URL and looked up by the
//! decoder. The returned [`ObjectUrl`] revokes its entry when dropped, so
//! every exit path of an export releases the handle exactly once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

const URL_PREFIX: &str = "blob:noisy-gradient/";

#[derive(Debug, Default)]
struct Entries {
    next_id: u64,
    documents: HashMap<String, Arc<[u8]>>,
}

/// Shared table of live object URLs. Cloning shares the table.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries stay consistent even if a holder panicked mid-lookup.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `bytes` and returns the owning handle.
    pub fn create(&self, bytes: Vec<u8>) -> ObjectUrl {
        let mut entries = self.lock();
        entries.next_id += 1;
        let url = format!("{URL_PREFIX}{}", entries.next_id);
        entries.documents.insert(url.clone(), bytes.into());
        debug!(%url, "object URL created");
        ObjectUrl {
            url,
            registry: self.clone(),
        }
    }

    /// Returns the document registered under `url`, if still live.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.lock().documents.get(url).cloned()
    }

    /// Number of URLs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().documents.len()
    }

    fn revoke(&self, url: &str) -> bool {
        self.lock().documents.remove(url).is_some()
    }
}

/// Owning handle to a registered document. Revokes the URL on drop.
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
    registry: ObjectUrlRegistry,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.registry.revoke(&self.url) {
            debug!(url = %self.url, "object URL revoked");
        }
    }
}
