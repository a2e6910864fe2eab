//! Wishlist page: every wishlisted book, resolved from the catalog.

use std::sync::Arc;
use std::time::Duration;

use futures::future;
use gutenshelf_api::{BookId, BookRecord, CatalogService};
use gutenshelf_core::config::BrowseConfig;
use gutenshelf_core::wishlist::SharedWishlist;

use crate::screen::{Action, LoadError, Phase, RequestSeq, Screen, Ticket};
use crate::task::Task;
use crate::view::{self, Render, ViewModel};

#[derive(Debug, Clone)]
pub enum Message {
    Load,
    Loaded {
        ticket: Ticket,
        result: Result<Vec<BookRecord>, LoadError>,
    },
    Remove(BookId),
}

/// Look up every id concurrently and wait for all of them to settle.
///
/// Any failure fails the whole batch; the error names the first failed id
/// in `ids` order. Records come back in `ids` order.
pub async fn resolve_all<C: CatalogService>(
    catalog: &C,
    ids: &[BookId],
) -> Result<Vec<BookRecord>, LoadError> {
    let results = future::join_all(ids.iter().map(|&id| catalog.get_book(id))).await;
    ids.iter()
        .zip(results)
        .map(|(&id, result)| {
            result.map_err(|source| {
                tracing::warn!(id, "wishlist lookup failed: {source}");
                LoadError::PartialFanoutFailure { id, source }
            })
        })
        .collect()
}

pub struct WishlistView<C> {
    catalog: Arc<C>,
    wishlist: SharedWishlist,
    stagger: Duration,
    phase: Phase,
    records: Vec<BookRecord>,
    requests: RequestSeq,
}

impl<C: CatalogService + 'static> WishlistView<C> {
    pub fn new(catalog: Arc<C>, wishlist: SharedWishlist, config: &BrowseConfig) -> Self {
        Self {
            catalog,
            wishlist,
            stagger: config.reveal_stagger(),
            phase: Phase::Idle,
            records: Vec::new(),
            requests: RequestSeq::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    fn fetch(&mut self) -> Action<Message> {
        let ticket = self.requests.issue();
        let ids = self.wishlist.list();
        self.records.clear();

        if ids.is_empty() {
            self.phase = Phase::Loaded;
            return Action::Redraw;
        }

        self.phase = Phase::Loading;
        tracing::debug!(count = ids.len(), "resolving wishlist");
        let catalog = Arc::clone(&self.catalog);
        Action::load(Task::perform(
            async move { resolve_all(catalog.as_ref(), &ids).await },
            move |result| Message::Loaded { ticket, result },
        ))
    }
}

impl<C: CatalogService + 'static> Screen for WishlistView<C> {
    type Message = Message;

    fn update(&mut self, message: Message) -> Action<Message> {
        match message {
            Message::Load => self.fetch(),
            Message::Loaded { ticket, result } => {
                if !self.requests.is_current(ticket) {
                    tracing::debug!("dropping superseded wishlist response");
                    return Action::None;
                }
                match result {
                    Ok(records) => {
                        self.records = records;
                        self.phase = Phase::Loaded;
                    }
                    Err(e) => {
                        tracing::error!("Error fetching wishlist books: {e}");
                        self.phase = Phase::Failed(e);
                    }
                }
                Action::Redraw
            }
            Message::Remove(id) => {
                if let Err(e) = self.wishlist.remove(id) {
                    tracing::warn!(id, "Failed to remove from wishlist: {e}");
                }
                self.fetch()
            }
        }
    }

    fn view(&self) -> Vec<Render> {
        match self.phase {
            Phase::Idle => Vec::new(),
            Phase::Loading => vec![Render::Skeleton],
            Phase::Failed(_) => vec![Render::Banner(view::WISHLIST_FAILED.into())],
            Phase::Loaded if self.records.is_empty() => {
                vec![Render::Empty(view::WISHLIST_EMPTY.into())]
            }
            Phase::Loaded => {
                let cards = self
                    .records
                    .iter()
                    .enumerate()
                    .map(|(i, record)| {
                        view::wishlist_card(&ViewModel::new(record, &self.wishlist), i, self.stagger)
                    })
                    .collect();
                vec![Render::Grid(cards)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gutenshelf_api::FetchError;

    use super::*;
    use crate::fake::{book, memory_wishlist, settle, FakeCatalog};

    fn view_for(catalog: &Arc<FakeCatalog>, wishlist: &SharedWishlist) -> WishlistView<FakeCatalog> {
        WishlistView::new(catalog.clone(), wishlist.clone(), &BrowseConfig::default())
    }

    #[tokio::test]
    async fn test_empty_wishlist_makes_no_request() {
        let catalog = Arc::new(FakeCatalog::numbered(3));
        let wishlist = memory_wishlist();
        let mut page = view_for(&catalog, &wishlist);

        let effects = page.update(Message::Load).flatten();
        assert!(effects.redraw);
        assert!(effects.task.is_empty());
        assert!(catalog.lookups().is_empty());
        assert_eq!(
            page.view(),
            vec![Render::Empty(view::WISHLIST_EMPTY.into())]
        );
    }

    #[tokio::test]
    async fn test_resolves_in_wishlist_order() {
        let catalog = Arc::new(FakeCatalog::new(vec![
            book(4, "Four", &["A", "B", "C", "D"]),
            book(5, "Five", &[]),
            book(6, "Six", &["Poetry"]),
        ]));
        let wishlist = memory_wishlist();
        for id in [6, 4, 5] {
            wishlist.add(id).unwrap();
        }
        let mut page = view_for(&catalog, &wishlist);
        settle(&mut page, Message::Load).await;

        assert_eq!(page.phase(), &Phase::Loaded);
        let ids: Vec<BookId> = page.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 4, 5]);

        let renders = page.view();
        let [Render::Grid(cards)] = renders.as_slice() else {
            panic!("expected a grid");
        };
        let genres: Vec<Option<&str>> = cards.iter().map(|c| c.genres.as_deref()).collect();
        assert_eq!(genres, vec![Some("Poetry"), Some("A, B, C..."), Some("Unknown")]);
        assert!(cards.iter().all(|c| c.indicator == view::Indicator::Wishlisted));
    }

    #[tokio::test]
    async fn test_one_failed_lookup_fails_whole_listing() {
        let catalog = Arc::new(
            FakeCatalog::new(vec![book(4, "Four", &[]), book(5, "Five", &[]), book(6, "Six", &[])])
                .failing_id(5),
        );
        let wishlist = memory_wishlist();
        for id in [4, 5, 6] {
            wishlist.add(id).unwrap();
        }
        let mut page = view_for(&catalog, &wishlist);
        settle(&mut page, Message::Load).await;

        // All three lookups were issued and settled.
        let mut lookups = catalog.lookups();
        lookups.sort_unstable();
        assert_eq!(lookups, vec![4, 5, 6]);

        match page.phase() {
            Phase::Failed(LoadError::PartialFanoutFailure { id, source }) => {
                assert_eq!(*id, 5);
                assert!(matches!(source, FetchError::RequestFailed { status: 404, .. }));
            }
            other => panic!("expected fan-out failure, got {other:?}"),
        }
        assert!(page.records().is_empty());
        assert_eq!(
            page.view(),
            vec![Render::Banner(view::WISHLIST_FAILED.into())]
        );
    }

    #[tokio::test]
    async fn test_first_failure_in_order_is_reported() {
        let catalog = Arc::new(FakeCatalog::numbered(9).failing_id(8).failing_id(3));
        let err = resolve_all(catalog.as_ref(), &[1, 8, 3]).await.unwrap_err();
        assert!(matches!(err, LoadError::PartialFanoutFailure { id: 8, .. }));
    }

    #[tokio::test]
    async fn test_remove_re_resolves() {
        let catalog = Arc::new(FakeCatalog::numbered(5));
        let wishlist = memory_wishlist();
        wishlist.add(1).unwrap();
        wishlist.add(2).unwrap();
        let mut page = view_for(&catalog, &wishlist);
        settle(&mut page, Message::Load).await;
        assert_eq!(page.records().len(), 2);

        settle(&mut page, Message::Remove(1)).await;
        assert!(!wishlist.contains(1));
        let ids: Vec<BookId> = page.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(catalog.lookups(), vec![1, 2, 2]);

        settle(&mut page, Message::Remove(2)).await;
        assert_eq!(
            page.view(),
            vec![Render::Empty(view::WISHLIST_EMPTY.into())]
        );
    }

    #[tokio::test]
    async fn test_remove_during_load_drops_old_result() {
        let catalog = Arc::new(FakeCatalog::numbered(5));
        let wishlist = memory_wishlist();
        wishlist.add(1).unwrap();
        wishlist.add(2).unwrap();
        let mut page = view_for(&catalog, &wishlist);

        let stale = page.update(Message::Load).flatten().task;
        settle(&mut page, Message::Remove(2)).await;
        for message in stale.collect().await {
            page.update(message);
        }
        let ids: Vec<BookId> = page.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
