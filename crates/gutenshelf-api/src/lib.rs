pub mod gutendex;
pub mod traits;

pub use traits::{
    BookId, BookPage, BookRecord, CatalogService, Copyright, FetchError, SearchQuery, PAGE_SIZE,
};
