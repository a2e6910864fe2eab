//! In-memory catalog and helpers for controller tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use gutenshelf_api::{
    BookId, BookPage, BookRecord, CatalogService, FetchError, SearchQuery, PAGE_SIZE,
};
use gutenshelf_core::storage::{KeyValueStore, Storage};
use gutenshelf_core::wishlist::{SharedWishlist, WishlistStore};

use crate::screen::{Effects, Screen};

pub fn book(id: BookId, title: &str, genres: &[&str]) -> BookRecord {
    BookRecord {
        id,
        title: title.to_string(),
        authors: vec![format!("Author {id}")],
        genres: genres.iter().map(|g| g.to_string()).collect(),
        ..Default::default()
    }
}

pub fn memory_wishlist() -> SharedWishlist {
    let store: Arc<dyn KeyValueStore> = Arc::new(Storage::open_memory().unwrap());
    WishlistStore::shared(store)
}

/// Catalog backed by a fixed list of books.
///
/// Search matches titles case-insensitively and pages by [`PAGE_SIZE`].
#[derive(Default)]
pub struct FakeCatalog {
    books: Vec<BookRecord>,
    failing_ids: HashSet<BookId>,
    failing_searches: HashSet<String>,
    queries: Mutex<Vec<SearchQuery>>,
    lookups: Mutex<Vec<BookId>>,
}

impl FakeCatalog {
    pub fn new(books: Vec<BookRecord>) -> Self {
        Self {
            books,
            ..Default::default()
        }
    }

    /// `count` books titled "Book N" with ids 1..=count.
    pub fn numbered(count: u64) -> Self {
        Self::new((1..=count).map(|id| book(id, &format!("Book {id}"), &[])).collect())
    }

    pub fn failing_id(mut self, id: BookId) -> Self {
        self.failing_ids.insert(id);
        self
    }

    pub fn failing_search(mut self, search: &str) -> Self {
        self.failing_searches.insert(search.to_string());
        self
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<BookId> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CatalogService for FakeCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<BookPage, FetchError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing_searches.contains(&query.search) {
            return Err(FetchError::RequestFailed {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }

        let needle = query.search.to_lowercase();
        let matching: Vec<&BookRecord> = self
            .books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .filter(|b| query.topic.as_deref().map_or(true, |t| b.has_genre(t)))
            .collect();

        let start = (query.page.saturating_sub(1) * PAGE_SIZE) as usize;
        if start > 0 && start >= matching.len() {
            return Err(FetchError::RequestFailed {
                status: 404,
                message: "Invalid page.".into(),
            });
        }
        let results: Vec<BookRecord> = matching
            .iter()
            .skip(start)
            .take(PAGE_SIZE as usize)
            .map(|b| (*b).clone())
            .collect();

        Ok(BookPage {
            count: matching.len() as u64,
            results,
        })
    }

    async fn get_book(&self, id: BookId) -> Result<BookRecord, FetchError> {
        self.lookups.lock().unwrap().push(id);
        if self.failing_ids.contains(&id) {
            return Err(FetchError::RequestFailed {
                status: 404,
                message: "Not found.".into(),
            });
        }
        self.books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| FetchError::RequestFailed {
                status: 404,
                message: "Not found.".into(),
            })
    }
}

/// Feed `message` to `screen` and resolve every resulting task, in arrival
/// order, until nothing is left to run.
pub async fn settle<S: Screen>(screen: &mut S, message: S::Message) -> Effects<S::Message> {
    let effects = screen.update(message).flatten();
    let mut pending: VecDeque<S::Message> = effects.task.collect().await.into();
    let mut last = Effects {
        redraw: effects.redraw,
        patches: effects.patches,
        task: crate::task::Task::none(),
    };
    while let Some(next) = pending.pop_front() {
        let more = screen.update(next).flatten();
        last.redraw |= more.redraw;
        last.patches.extend(more.patches);
        pending.extend(more.task.collect().await);
    }
    last
}
