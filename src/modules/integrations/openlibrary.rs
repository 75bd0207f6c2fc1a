//! Open Library client: ISBN lookup and title/author search.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::DomainError;
use crate::infrastructure::config::Config;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("lookup query must not be empty")]
    EmptyQuery,
    #[error("request to Open Library failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Open Library returned status {0}")]
    Status(reqwest::StatusCode),
}

impl From<LookupError> for DomainError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::EmptyQuery => {
                let mut errors = crate::domain::FieldErrors::new();
                errors.add("query", "Query must not be empty");
                DomainError::Validation(errors)
            }
            other => DomainError::External(other.to_string()),
        }
    }
}

/// A book suggestion from Open Library. Only fields the user confirms are
/// ever copied into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookCandidate {
    pub title: String,
    pub authors: Vec<String>,
    pub cover_url: Option<String>,
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub isbns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<i64>,
}

impl BookCandidate {
    /// Authors joined the way the form's author field expects them.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Author,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    Isbn(String),
    Title { query: String, limit: usize },
    Author { query: String, limit: usize },
}

/// Outcome of a lookup: an ISBN yields at most one book, a title or author
/// search yields a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LookupResult {
    Single { book: Option<BookCandidate> },
    List { books: Vec<BookCandidate> },
}

/// Raw search document, also consumed by the cover resolver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchDoc {
    pub title: Option<String>,
    pub author_name: Option<Vec<String>>,
    pub first_publish_year: Option<i32>,
    pub cover_i: Option<i64>,
    pub isbn: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    authors: Option<Vec<OpenLibraryAuthor>>,
    publish_date: Option<String>,
    cover: Option<OpenLibraryCover>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

fn is_known_author(name: &str) -> bool {
    let n = name.trim();
    !n.is_empty() && !n.eq_ignore_ascii_case("unknown author") && !n.eq_ignore_ascii_case("unknown")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Medium,
    Large,
}

impl CoverSize {
    fn suffix(self) -> &'static str {
        match self {
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

/// `{covers}/b/isbn/{isbn}-{M|L}.jpg`
pub fn isbn_cover_url(covers_url: &str, isbn: &str, size: CoverSize) -> String {
    format!(
        "{}/b/isbn/{}-{}.jpg",
        covers_url.trim_end_matches('/'),
        isbn,
        size.suffix()
    )
}

/// `{covers}/b/id/{cover_i}-L.jpg`
pub fn id_cover_url(covers_url: &str, cover_id: i64) -> String {
    format!("{}/b/id/{}-L.jpg", covers_url.trim_end_matches('/'), cover_id)
}

/// Strip hyphens and whitespace from a user-entered ISBN.
pub fn clean_isbn(isbn: &str) -> String {
    isbn.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

pub struct OpenLibraryClient {
    http: reqwest::Client,
    api_url: String,
    covers_url: String,
}

impl OpenLibraryClient {
    pub fn new(api_url: impl Into<String>, covers_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            covers_url: covers_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openlibrary_api_url.clone(),
            config.openlibrary_covers_url.clone(),
            config.http_timeout,
        )
    }

    pub fn covers_url(&self) -> &str {
        &self.covers_url
    }

    pub async fn lookup(&self, query: LookupQuery) -> Result<LookupResult, LookupError> {
        match query {
            LookupQuery::Isbn(isbn) => Ok(LookupResult::Single {
                book: self.lookup_isbn(&isbn).await?,
            }),
            LookupQuery::Title { query, limit } => Ok(LookupResult::List {
                books: self.search(SearchField::Title, &query, limit).await?,
            }),
            LookupQuery::Author { query, limit } => Ok(LookupResult::List {
                books: self.search(SearchField::Author, &query, limit).await?,
            }),
        }
    }

    /// Look a single edition up by ISBN. `Ok(None)` when Open Library has no
    /// record for it.
    pub async fn lookup_isbn(&self, isbn: &str) -> Result<Option<BookCandidate>, LookupError> {
        let isbn = clean_isbn(isbn);
        if isbn.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let url = format!(
            "{}/api/books?bibkeys=ISBN:{}&format=json&jscmd=data",
            self.api_url,
            urlencoding::encode(&isbn)
        );
        tracing::debug!("Open Library ISBN lookup: {}", url);

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status()));
        }

        let mut parsed: HashMap<String, OpenLibraryBook> = resp.json().await?;
        let Some(book) = parsed.remove(&format!("ISBN:{}", isbn)) else {
            tracing::info!("No Open Library record for ISBN {}", isbn);
            return Ok(None);
        };

        let authors = book
            .authors
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.name)
            .filter(|name| is_known_author(name))
            .collect();

        let cover_url = book
            .cover
            .and_then(|c| c.large.or(c.medium).or(c.small));

        Ok(Some(BookCandidate {
            title: book.title.unwrap_or_default(),
            authors,
            cover_url,
            publish_date: book.publish_date,
            isbns: vec![isbn],
            cover_id: None,
        }))
    }

    /// Search by title or author, keeping Open Library's ranking and taking
    /// the first `limit` results.
    pub async fn search(
        &self,
        field: SearchField,
        query: &str,
        limit: usize,
    ) -> Result<Vec<BookCandidate>, LookupError> {
        let (title, author) = match field {
            SearchField::Title => (Some(query), None),
            SearchField::Author => (None, Some(query)),
        };
        let docs = self.search_docs(title, author, Some(limit)).await?;

        Ok(docs
            .into_iter()
            .take(limit)
            .map(|doc| self.candidate_from_doc(doc))
            .collect())
    }

    /// Raw search over title and/or author. Blank parts are ignored.
    pub async fn search_docs(
        &self,
        title: Option<&str>,
        author: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<SearchDoc>, LookupError> {
        let mut params = Vec::new();
        if let Some(t) = title.map(str::trim).filter(|t| !t.is_empty()) {
            params.push(format!("title={}", urlencoding::encode(t)));
        }
        if let Some(a) = author.map(str::trim).filter(|a| !a.is_empty()) {
            params.push(format!("author={}", urlencoding::encode(a)));
        }
        if params.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        if let Some(limit) = limit {
            params.push(format!("limit={}", limit));
        }

        let url = format!("{}/search.json?{}", self.api_url, params.join("&"));
        tracing::debug!("Open Library search: {}", url);

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status()));
        }

        let parsed: OpenLibrarySearchResponse = resp.json().await?;
        tracing::debug!("Open Library search returned {} docs", parsed.docs.len());
        Ok(parsed.docs)
    }

    fn candidate_from_doc(&self, doc: SearchDoc) -> BookCandidate {
        let cover_url = doc.cover_i.map(|id| id_cover_url(&self.covers_url, id));

        BookCandidate {
            title: doc.title.unwrap_or_default(),
            authors: doc
                .author_name
                .unwrap_or_default()
                .into_iter()
                .filter(|name| is_known_author(name))
                .collect(),
            cover_url,
            publish_date: doc.first_publish_year.map(|y| y.to_string()),
            isbns: doc.isbn.unwrap_or_default(),
            cover_id: doc.cover_i,
        }
    }
}
