use crate::error::CoreError;
use crate::storage::KeyValueStore;

pub const SAVED_SEARCH_KEY: &str = "savedSearch";
pub const SAVED_GENRE_KEY: &str = "savedGenre";

/// Browse settings restored on load and saved when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub search: String,
    pub genre: Option<String>,
}

impl Preferences {
    /// Read saved preferences. Unreadable values fall back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let read = |key: &str| match store.get(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read {key}: {e}");
                String::new()
            }
        };
        let genre = read(SAVED_GENRE_KEY);
        Self {
            search: read(SAVED_SEARCH_KEY),
            genre: (!genre.is_empty()).then_some(genre),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), CoreError> {
        store.set(SAVED_SEARCH_KEY, &self.search)?;
        store.set(SAVED_GENRE_KEY, self.genre.as_deref().unwrap_or(""))?;
        Ok(())
    }
}
