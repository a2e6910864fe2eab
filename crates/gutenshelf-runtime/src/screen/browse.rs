//! Paged, searchable, genre-filterable book listing.
//!
//! State machine: `Idle → Loading → {Loaded, Failed}`, re-entered through
//! `Loading` by any search, page change, or retry. Search text is
//! debounced; only the last keystroke in a burst triggers a request. Every
//! request carries a [`Ticket`] and completions for superseded requests are
//! dropped, so a slow page-1 response can never overwrite page 2.

use std::sync::Arc;
use std::time::Duration;

use gutenshelf_api::{BookId, BookPage, BookRecord, CatalogService, FetchError, SearchQuery};
use gutenshelf_core::config::BrowseConfig;
use gutenshelf_core::preferences::Preferences;
use gutenshelf_core::wishlist::SharedWishlist;

use crate::screen::{Action, Phase, RequestSeq, Screen, Ticket};
use crate::task::Task;
use crate::view::{self, Indicator, Patch, Render, ViewModel};

/// Requested navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    Previous,
    Next,
    Goto(u32),
}

/// Messages handled by the browse screen.
#[derive(Debug, Clone)]
pub enum Message {
    /// Fetch the current page with the current search.
    Load,
    Retry,
    SearchTextChanged(String),
    DebounceElapsed(Ticket),
    /// `None` or an empty string restores the unfiltered page.
    GenreSelected(Option<String>),
    PageChanged(PageChange),
    PageLoaded {
        ticket: Ticket,
        query: SearchQuery,
        result: Result<BookPage, FetchError>,
    },
    WishlistToggled(BookId),
}

pub struct BrowseController<C> {
    catalog: Arc<C>,
    wishlist: SharedWishlist,
    debounce: Duration,
    stagger: Duration,
    phase: Phase,
    page: u32,
    total_pages: u32,
    /// Search text of the latest issued request.
    search: String,
    /// Text as typed, not yet committed by the debounce.
    draft: String,
    topic: Option<String>,
    genre: Option<String>,
    records: Vec<BookRecord>,
    genres: Vec<String>,
    requests: RequestSeq,
    keystrokes: RequestSeq,
}

impl<C: CatalogService + 'static> BrowseController<C> {
    pub fn new(catalog: Arc<C>, wishlist: SharedWishlist, config: &BrowseConfig) -> Self {
        Self {
            catalog,
            wishlist,
            debounce: config.debounce(),
            stagger: config.reveal_stagger(),
            phase: Phase::Idle,
            page: 1,
            total_pages: 1,
            search: String::new(),
            draft: String::new(),
            topic: None,
            genre: None,
            records: Vec::new(),
            genres: Vec::new(),
            requests: RequestSeq::default(),
            keystrokes: RequestSeq::default(),
        }
    }

    /// Restore a saved search and genre.
    ///
    /// The genre is kept only if the first loaded page carries it.
    pub fn with_preferences(mut self, prefs: Preferences) -> Self {
        self.search = prefs.search.clone();
        self.draft = prefs.search;
        self.genre = prefs.genre.filter(|g| !g.is_empty());
        self
    }

    /// Remote subject filter applied to every request of this session.
    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic.filter(|t| !t.trim().is_empty());
        self
    }

    /// Page requested by the first load. Later changes are clamped to the
    /// known page count.
    pub fn with_start_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self.total_pages = self.page;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    /// Genres observed on the current page, in first-seen order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// All records of the current page.
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Records after the genre filter.
    pub fn visible_records(&self) -> Vec<&BookRecord> {
        view::filter_by_genre(&self.records, self.genre.as_deref())
    }

    /// Current search and genre, for saving at session end.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            search: self.draft.clone(),
            genre: self.genre.clone(),
        }
    }

    fn fetch(&mut self) -> Action<Message> {
        let ticket = self.requests.issue();
        let query = SearchQuery::new(self.page, self.search.clone()).with_topic(self.topic.clone());
        self.phase = Phase::Loading;
        tracing::debug!(page = query.page, search = %query.search, "requesting page");

        let catalog = Arc::clone(&self.catalog);
        let request = query.clone();
        Action::load(Task::perform(
            async move { catalog.search(&request).await },
            move |result| Message::PageLoaded {
                ticket,
                query,
                result,
            },
        ))
    }

    fn page_loaded(
        &mut self,
        ticket: Ticket,
        query: SearchQuery,
        result: Result<BookPage, FetchError>,
    ) -> Action<Message> {
        if !self.requests.is_current(ticket) {
            tracing::debug!(
                page = query.page,
                search = %query.search,
                "dropping superseded page response"
            );
            return Action::None;
        }

        match result {
            Ok(page) => {
                self.total_pages = page.total_pages();
                self.records = page.results;
                self.genres = view::genre_options(&self.records);
                if let Some(ref genre) = self.genre {
                    if !self.genres.contains(genre) {
                        tracing::debug!(%genre, "genre not on this page, clearing filter");
                        self.genre = None;
                    }
                }
                self.phase = Phase::Loaded;
            }
            Err(e) => {
                tracing::error!(page = query.page, "Error fetching books: {e}");
                self.records.clear();
                self.genres.clear();
                self.phase = Phase::Failed(e.into());
            }
        }
        Action::Redraw
    }

    fn change_page(&mut self, change: PageChange) -> Action<Message> {
        if self.phase == Phase::Idle {
            return Action::None;
        }
        let requested = match change {
            PageChange::Previous => self.page.saturating_sub(1),
            PageChange::Next => self.page.saturating_add(1),
            PageChange::Goto(page) => page,
        };
        let target = requested.clamp(1, self.total_pages.max(1));
        if target == self.page {
            return Action::None;
        }
        self.page = target;
        self.fetch()
    }

    fn select_genre(&mut self, genre: Option<String>) -> Action<Message> {
        let genre = genre.filter(|g| !g.is_empty());
        if let Some(ref g) = genre {
            if !self.genres.contains(g) {
                tracing::debug!(genre = %g, "ignoring genre not offered on this page");
                return Action::None;
            }
        }
        if genre == self.genre {
            return Action::None;
        }
        self.genre = genre;
        Action::Redraw
    }

    fn toggle_wishlist(&self, id: BookId) -> Action<Message> {
        let wishlisted = match self.wishlist.toggle(id) {
            Ok(now) => now,
            Err(e) => {
                tracing::warn!(id, "Failed to toggle wishlist: {e}");
                self.wishlist.contains(id)
            }
        };
        Action::Patch(vec![Patch::Indicator {
            id,
            indicator: Indicator::from(wishlisted),
        }])
    }
}

impl<C: CatalogService + 'static> Screen for BrowseController<C> {
    type Message = Message;

    fn update(&mut self, message: Message) -> Action<Message> {
        match message {
            Message::Load | Message::Retry => self.fetch(),
            Message::SearchTextChanged(text) => {
                self.draft = text;
                let ticket = self.keystrokes.issue();
                Action::Run(Task::after(self.debounce, Message::DebounceElapsed(ticket)))
            }
            Message::DebounceElapsed(ticket) => {
                if !self.keystrokes.is_current(ticket) {
                    return Action::None;
                }
                self.search = self.draft.clone();
                self.page = 1;
                self.fetch()
            }
            Message::GenreSelected(genre) => self.select_genre(genre),
            Message::PageChanged(change) => self.change_page(change),
            Message::PageLoaded {
                ticket,
                query,
                result,
            } => self.page_loaded(ticket, query, result),
            Message::WishlistToggled(id) => self.toggle_wishlist(id),
        }
    }

    fn view(&self) -> Vec<Render> {
        let mut out = vec![Render::SearchBox {
            text: self.draft.clone(),
        }];

        match self.phase {
            Phase::Idle => {}
            Phase::Loading => out.push(Render::Skeleton),
            Phase::Failed(_) => out.push(Render::Banner(view::BROWSE_FAILED.into())),
            Phase::Loaded => {
                out.push(Render::GenreFilter {
                    options: self.genres.clone(),
                    selected: self.genre.clone(),
                });
                let visible = self.visible_records();
                if visible.is_empty() {
                    out.push(Render::Empty(view::NO_RESULTS.into()));
                } else {
                    let cards = visible
                        .into_iter()
                        .enumerate()
                        .map(|(i, record)| {
                            view::browse_card(&ViewModel::new(record, &self.wishlist), i, self.stagger)
                        })
                        .collect();
                    out.push(Render::Grid(cards));
                }
            }
        }

        let mut pager = view::pager(self.page, self.total_pages);
        if self.phase == Phase::Idle {
            // Nothing loaded yet, so paging would be ignored.
            pager.prev_enabled = false;
            pager.next_enabled = false;
        }
        out.push(Render::Pager(pager));
        out
    }
}
