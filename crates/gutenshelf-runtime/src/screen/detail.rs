//! Single-book detail page.

use std::sync::Arc;

use gutenshelf_api::{BookId, BookRecord, CatalogService, FetchError};
use gutenshelf_core::wishlist::SharedWishlist;

use crate::screen::{Action, Phase, RequestSeq, Screen, Ticket};
use crate::task::Task;
use crate::view::{self, Indicator, Patch, Render, ViewModel};

#[derive(Debug, Clone)]
pub enum Message {
    Load,
    Retry,
    Loaded {
        ticket: Ticket,
        result: Result<BookRecord, FetchError>,
    },
    WishlistToggled,
}

/// Book id from the `id` query parameter of a detail link.
///
/// Accepts `?id=84`, `id=84`, or a full `book-details.html?id=84` link,
/// relative or absolute. Fragments are ignored.
pub fn detail_id_from_query(input: &str) -> Option<BookId> {
    let input = input.split('#').next().unwrap_or_default();
    let query = input.split_once('?').map_or(input, |(_, q)| q);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.trim().parse().ok())
}

pub struct BookDetail<C> {
    catalog: Arc<C>,
    wishlist: SharedWishlist,
    id: BookId,
    phase: Phase,
    record: Option<BookRecord>,
    requests: RequestSeq,
}

impl<C: CatalogService + 'static> BookDetail<C> {
    pub fn new(catalog: Arc<C>, wishlist: SharedWishlist, id: BookId) -> Self {
        Self {
            catalog,
            wishlist,
            id,
            phase: Phase::Idle,
            record: None,
            requests: RequestSeq::default(),
        }
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn record(&self) -> Option<&BookRecord> {
        self.record.as_ref()
    }

    fn fetch(&mut self) -> Action<Message> {
        let ticket = self.requests.issue();
        let id = self.id;
        self.phase = Phase::Loading;
        tracing::debug!(id, "requesting book");

        let catalog = Arc::clone(&self.catalog);
        Action::load(Task::perform(
            async move { catalog.get_book(id).await },
            move |result| Message::Loaded { ticket, result },
        ))
    }
}

impl<C: CatalogService + 'static> Screen for BookDetail<C> {
    type Message = Message;

    fn update(&mut self, message: Message) -> Action<Message> {
        match message {
            Message::Load | Message::Retry => self.fetch(),
            Message::Loaded { ticket, result } => {
                if !self.requests.is_current(ticket) {
                    tracing::debug!(id = self.id, "dropping superseded book response");
                    return Action::None;
                }
                match result {
                    Ok(record) => {
                        self.record = Some(record);
                        self.phase = Phase::Loaded;
                    }
                    Err(e) => {
                        tracing::error!(id = self.id, "Error fetching book details: {e}");
                        self.record = None;
                        self.phase = Phase::Failed(e.into());
                    }
                }
                Action::Redraw
            }
            Message::WishlistToggled => {
                let wishlisted = self.wishlist.toggle(self.id).unwrap_or_else(|e| {
                    tracing::warn!(id = self.id, "Failed to toggle wishlist: {e}");
                    self.wishlist.contains(self.id)
                });
                Action::Patch(vec![Patch::Indicator {
                    id: self.id,
                    indicator: Indicator::from(wishlisted),
                }])
            }
        }
    }

    fn view(&self) -> Vec<Render> {
        match (&self.phase, &self.record) {
            (Phase::Loading, _) => vec![Render::Skeleton],
            (Phase::Failed(_), _) => vec![Render::Banner(view::DETAIL_FAILED.into())],
            (Phase::Loaded, Some(record)) => {
                vec![Render::Detail(view::detail(&ViewModel::new(
                    record,
                    &self.wishlist,
                )))]
            }
            _ => Vec::new(),
        }
    }
}
