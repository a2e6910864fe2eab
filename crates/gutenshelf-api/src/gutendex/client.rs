use reqwest::Client;
use url::Url;

use super::types::{parse_book, parse_page};
use crate::traits::{BookId, BookPage, BookRecord, CatalogService, FetchError, SearchQuery};

/// Public Gutendex instance.
pub const DEFAULT_BASE_URL: &str = "https://gutendex.com/books";

/// Gutendex (Project Gutenberg) catalog client.
pub struct GutendexClient {
    base_url: Url,
    http: Client,
}

impl GutendexClient {
    /// Create a client for the given `/books` endpoint.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let trimmed = base_url.trim_end_matches('/');
        Ok(Self {
            base_url: Url::parse(trimmed)?,
            http: Client::new(),
        })
    }

    /// URL for a paged listing, e.g. `/books?page=2&search=dogs`.
    pub fn search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("search", &query.search);
            if let Some(ref topic) = query.topic {
                pairs.append_pair("topic", topic);
            }
        }
        url
    }

    /// URL for a single book, e.g. `/books/84`.
    pub fn book_url(&self, id: BookId) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/{id}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url
    }

    /// Check the HTTP response for errors and return the body text.
    async fn read_body(resp: reqwest::Response) -> Result<String, FetchError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Gutendex API error");
            Err(FetchError::RequestFailed {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl CatalogService for GutendexClient {
    async fn search(&self, query: &SearchQuery) -> Result<BookPage, FetchError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "fetching book page");

        let resp = self.http.get(url).send().await?;
        let body = Self::read_body(resp).await?;
        parse_page(&body)
    }

    async fn get_book(&self, id: BookId) -> Result<BookRecord, FetchError> {
        let url = self.book_url(id);
        tracing::debug!(%url, "fetching book");

        let resp = self.http.get(url).send().await?;
        let body = Self::read_body(resp).await?;
        parse_book(&body)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on a local port and return the
    /// `/books` base URL pointing at it.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/books")
    }

    #[test]
    fn test_search_url() {
        let client = GutendexClient::new(DEFAULT_BASE_URL).unwrap();
        let url = client.search_url(&SearchQuery::new(2, "sherlock holmes"));
        assert_eq!(
            url.as_str(),
            "https://gutendex.com/books?page=2&search=sherlock+holmes"
        );
    }

    #[test]
    fn test_search_url_with_topic() {
        let client = GutendexClient::new("https://gutendex.com/books/").unwrap();
        let query = SearchQuery::new(1, "").with_topic(Some("Children's Literature".into()));
        let url = client.search_url(&query);
        assert_eq!(url.path(), "/books");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("search".to_string(), String::new()),
                ("topic".to_string(), "Children's Literature".to_string()),
            ]
        );
    }

    #[test]
    fn test_book_url() {
        let client = GutendexClient::new("http://localhost:8000/books").unwrap();
        assert_eq!(client.book_url(84).as_str(), "http://localhost:8000/books/84");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(GutendexClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_error_status_is_request_failed() {
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops",
        )
        .await;
        let client = GutendexClient::new(&base).unwrap();

        let err = client.search(&SearchQuery::new(1, "dogs")).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::RequestFailed {
                status: 500,
                message: "oops".into()
            }
        );
    }

    #[tokio::test]
    async fn test_not_found_book_is_request_failed() {
        let base = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: 23\r\nConnection: close\r\n\r\n{\"detail\":\"Not found.\"}",
        )
        .await;
        let client = GutendexClient::new(&base).unwrap();

        let err = client.get_book(999_999).await.unwrap_err();
        assert!(matches!(err, FetchError::RequestFailed { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot json!",
        )
        .await;
        let client = GutendexClient::new(&base).unwrap();

        let err = client.get_book(84).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 37\r\nConnection: close\r\n\r\n{\"count\":33,\"next\":null,\"results\":[]}",
        )
        .await;
        let client = GutendexClient::new(&base).unwrap();

        let page = client.search(&SearchQuery::default()).await.unwrap();
        assert_eq!(page.count, 33);
        assert_eq!(page.total_pages(), 2);
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = GutendexClient::new(&format!("http://{addr}/books")).unwrap();

        let err = client.get_book(84).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
