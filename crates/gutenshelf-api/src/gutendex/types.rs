use std::collections::BTreeMap;

use serde::Deserialize;

use crate::traits::{BookPage, BookRecord, Copyright, FetchError};

/// MIME label Gutendex uses for cover images.
pub const COVER_FORMAT: &str = "image/jpeg";

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GutendexListResponse {
    pub count: u64,
    #[serde(default)]
    pub results: Vec<GutendexBook>,
}

#[derive(Debug, Deserialize)]
pub struct GutendexBook {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<GutendexPerson>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub bookshelves: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub copyright: Option<bool>,
    #[serde(default)]
    pub formats: BTreeMap<String, String>,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub summaries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GutendexPerson {
    pub name: String,
    #[allow(dead_code)]
    pub birth_year: Option<i32>,
    #[allow(dead_code)]
    pub death_year: Option<i32>,
}

// ── Conversions to shared trait types ───────────────────────────

impl GutendexBook {
    pub fn into_record(self) -> BookRecord {
        let mut genres: Vec<String> = Vec::with_capacity(self.bookshelves.len());
        for shelf in self.bookshelves {
            if !genres.contains(&shelf) {
                genres.push(shelf);
            }
        }

        BookRecord {
            id: self.id,
            title: self.title,
            authors: self.authors.into_iter().map(|a| a.name).collect(),
            genres,
            subjects: self.subjects,
            cover_url: self.formats.get(COVER_FORMAT).cloned(),
            formats: self.formats,
            download_count: self.download_count,
            languages: self.languages,
            copyright: Copyright::from(self.copyright),
            summaries: self.summaries,
        }
    }
}

impl GutendexListResponse {
    pub fn into_page(self) -> BookPage {
        BookPage {
            count: self.count,
            results: self.results.into_iter().map(|b| b.into_record()).collect(),
        }
    }
}

/// Parse a `/books` listing body.
pub fn parse_page(body: &str) -> Result<BookPage, FetchError> {
    serde_json::from_str::<GutendexListResponse>(body)
        .map(GutendexListResponse::into_page)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

/// Parse a `/books/{id}` body.
pub fn parse_book(body: &str) -> Result<BookRecord, FetchError> {
    serde_json::from_str::<GutendexBook>(body)
        .map(GutendexBook::into_record)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))
}
