//! Pure rendering: view models in, render instructions out.
//!
//! Nothing here touches the wishlist or the network. Controllers build
//! [`ViewModel`]s by looking up membership at render time and hand them to
//! these functions; painters (the CLI, tests) consume the [`Render`] list.

use std::time::Duration;

use gutenshelf_api::{BookId, BookRecord};
use gutenshelf_core::wishlist::WishlistStore;

pub const BROWSE_FAILED: &str = "Failed to fetch books. Please try again later.";
pub const DETAIL_FAILED: &str = "Failed to fetch book details. Please try again later.";
pub const WISHLIST_FAILED: &str = "Failed to fetch wishlist books. Please try again later.";
pub const WISHLIST_EMPTY: &str = "Your wishlist is empty.";
pub const NO_RESULTS: &str = "No books found.";
pub const NO_DESCRIPTION: &str = "No description available.";

/// Wishlist cards list at most this many genres.
const GENRE_SUMMARY_LIMIT: usize = 3;

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    SearchBox { text: String },
    GenreFilter {
        options: Vec<String>,
        selected: Option<String>,
    },
    /// Placeholder shown while a request is in flight.
    Skeleton,
    /// Non-blocking error message.
    Banner(String),
    Grid(Vec<Card>),
    Empty(String),
    Pager(Pager),
    Detail(DetailView),
}

/// Incremental update that avoids redrawing a whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    Indicator { id: BookId, indicator: Indicator },
}

/// Wishlist heart shown on cards and the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Wishlisted,
    NotWishlisted,
}

impl Indicator {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Wishlisted => "❤️",
            Self::NotWishlisted => "🤍",
        }
    }

    /// Button label on the detail page.
    pub fn detail_label(self) -> &'static str {
        match self {
            Self::Wishlisted => "❤️ Remove from Wishlist",
            Self::NotWishlisted => "🤍 Add to Wishlist",
        }
    }
}

impl From<bool> for Indicator {
    fn from(wishlisted: bool) -> Self {
        if wishlisted {
            Self::Wishlisted
        } else {
            Self::NotWishlisted
        }
    }
}

/// A record paired with its wishlist membership at render time.
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub record: &'a BookRecord,
    pub is_wishlisted: bool,
}

impl<'a> ViewModel<'a> {
    pub fn new(record: &'a BookRecord, wishlist: &WishlistStore) -> Self {
        Self {
            record,
            is_wishlisted: wishlist.contains(record.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: BookId,
    pub title: String,
    pub authors: String,
    pub cover_url: Option<String>,
    pub link: String,
    /// Short genre line; wishlist cards only.
    pub genres: Option<String>,
    pub indicator: Indicator,
    /// Cosmetic staggered reveal delay.
    pub reveal_after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub page_title: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub authors: String,
    pub genres: String,
    pub download_count: u64,
    pub languages: String,
    pub copyright: String,
    pub description: String,
    pub links: Vec<DownloadLink>,
    pub indicator: Indicator,
}

/// Relative link to a book's detail page.
pub fn book_link(id: BookId) -> String {
    format!("book-details.html?id={id}")
}

fn base_card(vm: &ViewModel<'_>, index: usize, stagger: Duration) -> Card {
    let record = vm.record;
    Card {
        id: record.id,
        title: record.title.clone(),
        authors: record.author_line(),
        cover_url: record.cover_url.clone(),
        link: book_link(record.id),
        genres: None,
        indicator: Indicator::from(vm.is_wishlisted),
        reveal_after: stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)),
    }
}

/// Card for the browse grid.
pub fn browse_card(vm: &ViewModel<'_>, index: usize, stagger: Duration) -> Card {
    base_card(vm, index, stagger)
}

/// Card for the wishlist grid, which also lists a few genres.
pub fn wishlist_card(vm: &ViewModel<'_>, index: usize, stagger: Duration) -> Card {
    Card {
        genres: Some(genre_summary(&vm.record.genres)),
        ..base_card(vm, index, stagger)
    }
}

/// First three genres, with "..." when there are more.
pub fn genre_summary(genres: &[String]) -> String {
    if genres.is_empty() {
        return "Unknown".into();
    }
    let shown = genres
        .iter()
        .take(GENRE_SUMMARY_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if genres.len() > GENRE_SUMMARY_LIMIT {
        format!("{shown}...")
    } else {
        shown
    }
}

pub fn pager(page: u32, total_pages: u32) -> Pager {
    let total_pages = total_pages.max(1);
    Pager {
        page,
        total_pages,
        prev_enabled: page > 1,
        next_enabled: page < total_pages,
    }
}

pub fn detail(vm: &ViewModel<'_>) -> DetailView {
    let record = vm.record;
    let genres = if record.genres.is_empty() {
        "N/A".to_string()
    } else {
        record.genres.join(", ")
    };
    DetailView {
        page_title: format!("{} - Gutendex Book Explorer", record.title),
        title: record.title.clone(),
        cover_url: record.cover_url.clone(),
        authors: record.author_line(),
        genres,
        download_count: record.download_count,
        languages: record.languages.join(", "),
        copyright: record.copyright.to_string(),
        description: record
            .summaries
            .first()
            .cloned()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        links: record
            .formats
            .iter()
            .map(|(label, url)| DownloadLink {
                label: label.clone(),
                url: url.clone(),
            })
            .collect(),
        indicator: Indicator::from(vm.is_wishlisted),
    }
}

/// Genre options observed across `records`, in first-seen order.
pub fn genre_options(records: &[BookRecord]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for genre in records.iter().flat_map(|r| &r.genres) {
        if !options.contains(genre) {
            options.push(genre.clone());
        }
    }
    options
}

/// Records carrying `genre`, or all of them when no genre is selected.
pub fn filter_by_genre<'a>(records: &'a [BookRecord], genre: Option<&str>) -> Vec<&'a BookRecord> {
    match genre {
        Some(genre) => records.iter().filter(|r| r.has_genre(genre)).collect(),
        None => records.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use gutenshelf_api::Copyright;

    use super::*;

    fn record(id: BookId, genres: &[&str]) -> BookRecord {
        BookRecord {
            id,
            title: format!("Book {id}"),
            authors: vec!["Austen, Jane".into(), "Brontë, Charlotte".into()],
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pager_boundaries() {
        let first = pager(1, 5);
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);

        let last = pager(5, 5);
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);

        let only = pager(1, 0);
        assert_eq!(only.total_pages, 1);
        assert!(!only.prev_enabled && !only.next_enabled);
    }

    #[test]
    fn test_card_reveal_is_staggered() {
        let book = record(7, &[]);
        let vm = ViewModel {
            record: &book,
            is_wishlisted: true,
        };
        let card = browse_card(&vm, 4, Duration::from_millis(50));
        assert_eq!(card.reveal_after, Duration::from_millis(200));
        assert_eq!(card.indicator, Indicator::Wishlisted);
        assert_eq!(card.link, "book-details.html?id=7");
        assert_eq!(card.authors, "Austen, Jane, Brontë, Charlotte");
        assert!(card.genres.is_none());
    }

    #[test]
    fn test_wishlist_card_genre_summary() {
        let book = record(1, &["A", "B", "C", "D"]);
        let vm = ViewModel {
            record: &book,
            is_wishlisted: true,
        };
        let card = wishlist_card(&vm, 0, Duration::ZERO);
        assert_eq!(card.genres.as_deref(), Some("A, B, C..."));

        assert_eq!(genre_summary(&["A".into(), "B".into()]), "A, B");
        assert_eq!(genre_summary(&[]), "Unknown");
    }

    #[test]
    fn test_detail_view() {
        let mut book = record(84, &[]);
        book.title = "Frankenstein".into();
        book.languages = vec!["en".into(), "fr".into()];
        book.copyright = Copyright::No;
        book.formats.insert("text/plain".into(), "https://x/84.txt".into());
        book.formats.insert("application/epub+zip".into(), "https://x/84.epub".into());

        let view = detail(&ViewModel {
            record: &book,
            is_wishlisted: false,
        });
        assert_eq!(view.page_title, "Frankenstein - Gutendex Book Explorer");
        assert_eq!(view.genres, "N/A");
        assert_eq!(view.languages, "en, fr");
        assert_eq!(view.copyright, "No");
        assert_eq!(view.description, NO_DESCRIPTION);
        assert_eq!(view.indicator.detail_label(), "🤍 Add to Wishlist");
        let labels: Vec<&str> = view.links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["application/epub+zip", "text/plain"]);
    }

    #[test]
    fn test_genre_options_first_seen_order() {
        let records = vec![
            record(1, &["Fiction", "Humor"]),
            record(2, &["Poetry", "Fiction"]),
        ];
        assert_eq!(genre_options(&records), vec!["Fiction", "Humor", "Poetry"]);
    }

    #[test]
    fn test_filter_by_genre() {
        let records = vec![
            record(1, &["Fiction"]),
            record(2, &["Poetry"]),
            record(3, &["Fiction", "Poetry"]),
        ];
        let ids = |v: Vec<&BookRecord>| v.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids(filter_by_genre(&records, Some("Fiction"))), vec![1, 3]);
        assert_eq!(ids(filter_by_genre(&records, None)), vec![1, 2, 3]);
        assert!(filter_by_genre(&records, Some("Drama")).is_empty());
    }
}
