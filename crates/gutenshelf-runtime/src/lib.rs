pub mod driver;
pub mod screen;
pub mod task;
pub mod view;

#[cfg(test)]
mod fake;

use std::sync::Arc;

use gutenshelf_api::gutendex::GutendexClient;
use gutenshelf_api::BookId;
use gutenshelf_core::config::AppConfig;
use gutenshelf_core::error::CoreError;
use gutenshelf_core::preferences::Preferences;
use gutenshelf_core::storage::{KeyValueStore, Storage};
use gutenshelf_core::wishlist::{SharedWishlist, WishlistStore};

use screen::browse::BrowseController;
use screen::detail::BookDetail;
use screen::wishlist::WishlistView;

pub use driver::{Driver, Frame};

// Book ids cross from catalog records into the wishlist unconverted.
const _: fn(BookId) -> gutenshelf_core::wishlist::BookId = |id| id;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Storage(#[from] CoreError),
}

/// One session's wiring: config, storage, catalog client, wishlist.
///
/// Every screen built from the same runtime shares one wishlist handle.
pub struct Runtime {
    config: AppConfig,
    storage: Arc<Storage>,
    catalog: Arc<GutendexClient>,
    wishlist: SharedWishlist,
}

impl Runtime {
    /// Open the configured database and build a catalog client.
    pub fn new(config: AppConfig) -> Result<Self, RuntimeError> {
        let db_path = config.ensure_db_path()?;
        tracing::debug!(path = %db_path.display(), "opening storage");
        let storage = Storage::open(&db_path)?;
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: AppConfig, storage: Storage) -> Result<Self, RuntimeError> {
        let catalog = GutendexClient::new(&config.catalog.base_url).map_err(|e| {
            RuntimeError::Config(format!(
                "invalid catalog.base_url {:?}: {e}",
                config.catalog.base_url
            ))
        })?;
        let storage = Arc::new(storage);
        let store: Arc<dyn KeyValueStore> = storage.clone();
        let wishlist = WishlistStore::shared(store);

        Ok(Self {
            config,
            storage,
            catalog: Arc::new(catalog),
            wishlist,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn wishlist(&self) -> &SharedWishlist {
        &self.wishlist
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::load(self.storage.as_ref())
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<(), RuntimeError> {
        prefs.save(self.storage.as_ref())?;
        Ok(())
    }

    /// Browse screen with the saved search and genre restored.
    pub fn browse(&self) -> BrowseController<GutendexClient> {
        BrowseController::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.wishlist),
            &self.config.browse,
        )
        .with_preferences(self.preferences())
    }

    pub fn detail(&self, id: BookId) -> BookDetail<GutendexClient> {
        BookDetail::new(Arc::clone(&self.catalog), Arc::clone(&self.wishlist), id)
    }

    pub fn wishlist_view(&self) -> WishlistView<GutendexClient> {
        WishlistView::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.wishlist),
            &self.config.browse,
        )
    }
}
