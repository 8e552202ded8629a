//! Handles to rendered documents held in memory.
//!
//! The preview surface doesn't display bytes directly; it is given a [`BlobUrl`]
//! that resolves to the bytes through a [`BlobRegistry`]. Every URL stays live,
//! and keeps its bytes alive, until it is revoked, so whoever creates one is
//! responsible for revoking it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
struct Registry {
    next: u64,
    blobs: HashMap<BlobUrl, Arc<[u8]>>,
}

/// A shareable registry of live blob URLs. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl BlobRegistry {
    pub fn new() -> BlobRegistry {
        BlobRegistry::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // the map stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register bytes and return a fresh URL for them.
    pub fn create(&self, bytes: Vec<u8>) -> BlobUrl {
        let mut registry = self.lock();
        registry.next += 1;
        let url = BlobUrl(format!("blob:grimorium/{}", registry.next));
        registry.blobs.insert(url.clone(), Arc::from(bytes));
        log::debug!("created {url} ({} live)", registry.blobs.len());
        url
    }

    /// Release a URL. Returns `false` if it was not live.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        let mut registry = self.lock();
        let removed = registry.blobs.remove(url).is_some();
        if removed {
            log::debug!("revoked {url} ({} live)", registry.blobs.len());
        }
        removed
    }

    pub fn get(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.lock().blobs.get(url).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn urls_resolve_until_revoked() {
        let blobs = BlobRegistry::new();
        let url = blobs.create(b"%PDF-1.7".to_vec());
        assert!(url.as_str().starts_with("blob:"));
        assert_eq!(blobs.get(&url).as_deref(), Some(&b"%PDF-1.7"[..]));
        assert_eq!(blobs.live_count(), 1);

        assert!(blobs.revoke(&url));
        assert!(blobs.get(&url).is_none());
        assert!(!blobs.revoke(&url));
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn every_create_gets_a_new_url() {
        let blobs = BlobRegistry::new();
        let a = blobs.create(vec![1]);
        let b = blobs.create(vec![1]);
        assert_ne!(a, b);
        assert_eq!(blobs.clone().live_count(), 2);
    }
}
