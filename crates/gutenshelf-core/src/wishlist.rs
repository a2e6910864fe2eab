//! The durable set of wishlisted book identifiers.
//!
//! The persisted value under [`WISHLIST_KEY`] is the single source of truth
//! for membership. Every mutation rewrites the whole set before returning,
//! so a reload right after a toggle never loses it.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::CoreError;
use crate::storage::KeyValueStore;

/// Storage key holding a JSON array of integer ids.
pub const WISHLIST_KEY: &str = "wishlist";

/// Book identifier as assigned by the remote catalog.
///
/// Same type as `gutenshelf_api::BookId`; this crate does not depend on the
/// api crate, so the alias is repeated here.
pub type BookId = u64;

/// Wishlist handle shared by every controller in a session.
pub type SharedWishlist = Arc<WishlistStore>;

pub struct WishlistStore {
    store: Arc<dyn KeyValueStore>,
    ids: Mutex<Vec<BookId>>,
}

impl WishlistStore {
    /// Load the wishlist from `store`.
    ///
    /// A missing, unreadable, or corrupt entry starts an empty wishlist.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let ids = match store.get(WISHLIST_KEY) {
            Ok(Some(raw)) => decode(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt wishlist entry: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read wishlist, starting empty: {e}");
                Vec::new()
            }
        };
        tracing::debug!(count = ids.len(), "wishlist loaded");
        Self {
            store,
            ids: Mutex::new(ids),
        }
    }

    pub fn shared(store: Arc<dyn KeyValueStore>) -> SharedWishlist {
        Arc::new(Self::load(store))
    }

    pub fn contains(&self, id: BookId) -> bool {
        self.ids().map(|ids| ids.contains(&id)).unwrap_or(false)
    }

    /// Add `id` if absent, remove it if present. Returns the new membership.
    pub fn toggle(&self, id: BookId) -> Result<bool, CoreError> {
        self.mutate(|ids| match ids.iter().position(|&x| x == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id);
                true
            }
        })
    }

    /// Add `id`. Returns `false` if it was already present.
    pub fn add(&self, id: BookId) -> Result<bool, CoreError> {
        self.mutate(|ids| {
            if ids.contains(&id) {
                return false;
            }
            ids.push(id);
            true
        })
    }

    /// Remove `id`. Returns `false` if it was not present.
    pub fn remove(&self, id: BookId) -> Result<bool, CoreError> {
        self.mutate(|ids| {
            let before = ids.len();
            ids.retain(|&x| x != id);
            ids.len() != before
        })
    }

    /// Remove every id and drop the persisted entry.
    pub fn clear(&self) -> Result<(), CoreError> {
        let mut ids = self.ids()?;
        if let Err(e) = self.store.delete(WISHLIST_KEY) {
            tracing::warn!("Failed to clear wishlist, nothing removed: {e}");
            return Err(e);
        }
        ids.clear();
        Ok(())
    }

    /// Snapshot of the current ids in insertion order.
    pub fn list(&self) -> Vec<BookId> {
        self.ids().map(|ids| ids.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ids().map(|ids| ids.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ids(&self) -> Result<MutexGuard<'_, Vec<BookId>>, CoreError> {
        self.ids.lock().map_err(|_| CoreError::Poisoned)
    }

    /// Apply `f` under the lock and write the result through. Rolls back if
    /// the write fails; skips the write if `f` changed nothing.
    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<BookId>) -> T) -> Result<T, CoreError> {
        let mut ids = self.ids()?;
        let before = ids.clone();
        let out = f(&mut *ids);
        if *ids == before {
            return Ok(out);
        }
        let written = serde_json::to_string(&*ids)
            .map_err(CoreError::from)
            .and_then(|json| self.store.set(WISHLIST_KEY, &json));
        if let Err(e) = written {
            tracing::warn!("Failed to persist wishlist, change reverted: {e}");
            *ids = before;
            return Err(e);
        }
        Ok(out)
    }
}

/// Decode a persisted id array, collapsing duplicates (first occurrence wins).
fn decode(raw: &str) -> Result<Vec<BookId>, serde_json::Error> {
    let parsed: Vec<BookId> = serde_json::from_str(raw)?;
    let mut ids = Vec::with_capacity(parsed.len());
    for id in parsed {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
