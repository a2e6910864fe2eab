//! Trait definitions for book catalog services.
//!
//! The Gutendex client implements [`CatalogService`]; controllers only see
//! the trait and the shared record types below, so tests can swap in a
//! fake catalog.

use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;

/// Identifier assigned to a book by the remote catalog.
pub type BookId = u64;

/// Number of records the catalog returns per page. Fixed server-side.
pub const PAGE_SIZE: u32 = 32;

/// A read-only book catalog.
pub trait CatalogService: Send + Sync {
    /// Fetch one page of books matching the query.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<BookPage, FetchError>> + Send;

    /// Fetch a single book by its catalog identifier.
    fn get_book(&self, id: BookId) -> impl Future<Output = Result<BookRecord, FetchError>> + Send;
}

/// Errors surfaced by a catalog request. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed (status {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::RequestFailed {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => Self::Transport(e.to_string()),
        }
    }
}

/// Parameters for a paged catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// 1-based page number.
    pub page: u32,
    /// Free-text search; matched by the remote side.
    pub search: String,
    /// Remote subject/bookshelf filter.
    pub topic: Option<String>,
}

impl SearchQuery {
    pub fn new(page: u32, search: impl Into<String>) -> Self {
        Self {
            page: page.max(1),
            search: search.into(),
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic.filter(|t| !t.trim().is_empty());
        self
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new(1, "")
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPage {
    /// Total number of matching records across all pages.
    pub count: u64,
    pub results: Vec<BookRecord>,
}

impl BookPage {
    /// Number of pages for this result set. Never less than 1.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.count)
    }
}

/// `ceil(count / PAGE_SIZE)`, clamped to at least one page.
pub fn total_pages(count: u64) -> u32 {
    let pages = count.div_ceil(u64::from(PAGE_SIZE));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Copyright status as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Copyright {
    Yes,
    No,
    #[default]
    Unknown,
}

impl From<Option<bool>> for Copyright {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Copyright {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "Yes"),
            Self::No => write!(f, "No"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A book as returned by any catalog service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<String>,
    /// Genre tags (Gutenberg bookshelves), de-duplicated, in API order.
    pub genres: Vec<String>,
    pub subjects: Vec<String>,
    pub cover_url: Option<String>,
    /// Download format label (MIME type) to URL.
    pub formats: BTreeMap<String, String>,
    pub download_count: u64,
    pub languages: Vec<String>,
    pub copyright: Copyright,
    pub summaries: Vec<String>,
}

impl BookRecord {
    /// Whether the record carries the given genre tag.
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Authors joined for display.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}
