//! In-process cache of the book list.
//!
//! A single entry keyed by [`BOOKS_QUERY_KEY`] holds the last fetched record
//! set. Mutations call [`BookCache::invalidate`], which marks the entry stale,
//! refetches from the store and broadcasts the new snapshot to subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::domain::{BookRepository, DomainError};
use crate::models::Book;

pub const BOOKS_QUERY_KEY: &str = "books";

const EVENT_CAPACITY: usize = 64;

pub type Snapshot = Arc<Vec<Book>>;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheEvent {
    Invalidated { key: &'static str },
    Refreshed { key: &'static str, books: Snapshot },
    RefreshFailed { key: &'static str, error: String },
}

impl CacheEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CacheEvent::Invalidated { .. } => "invalidated",
            CacheEvent::Refreshed { .. } => "refreshed",
            CacheEvent::RefreshFailed { .. } => "refresh_failed",
        }
    }
}

#[derive(Default)]
struct Entry {
    books: Option<Snapshot>,
    stale: bool,
    fetched_at: Option<DateTime<Utc>>,
}

pub struct BookCache {
    repo: Arc<dyn BookRepository>,
    entry: RwLock<Entry>,
    events: broadcast::Sender<CacheEvent>,
}

impl BookCache {
    pub fn new(repo: Arc<dyn BookRepository>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            repo,
            entry: RwLock::new(Entry::default()),
            events,
        }
    }

    pub fn key(&self) -> &'static str {
        BOOKS_QUERY_KEY
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Cached snapshot, fetching first when the entry is empty or stale.
    pub async fn get(&self) -> Result<Snapshot, DomainError> {
        {
            let entry = self.entry.read().await;
            if let Some(books) = &entry.books
                && !entry.stale
            {
                return Ok(books.clone());
            }
        }
        self.refetch().await
    }

    /// Current snapshot without fetching.
    pub async fn peek(&self) -> Option<Snapshot> {
        self.entry.read().await.books.clone()
    }

    pub async fn is_stale(&self) -> bool {
        let entry = self.entry.read().await;
        entry.stale || entry.books.is_none()
    }

    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.read().await.fetched_at
    }

    /// Mark the entry stale and refetch it.
    ///
    /// On a failed refetch the previous snapshot stays in place, still marked
    /// stale, so the next [`get`](Self::get) retries.
    pub async fn invalidate(&self) -> Result<Snapshot, DomainError> {
        self.entry.write().await.stale = true;
        tracing::debug!("Cache entry '{}' invalidated", BOOKS_QUERY_KEY);
        let _ = self.events.send(CacheEvent::Invalidated {
            key: BOOKS_QUERY_KEY,
        });
        self.refetch().await
    }

    async fn refetch(&self) -> Result<Snapshot, DomainError> {
        let mut entry = self.entry.write().await;
        match self.repo.list().await {
            Ok(books) => {
                let snapshot: Snapshot = Arc::new(books);
                entry.books = Some(snapshot.clone());
                entry.stale = false;
                entry.fetched_at = Some(Utc::now());
                drop(entry);

                tracing::debug!(
                    "Cache entry '{}' refreshed with {} books",
                    BOOKS_QUERY_KEY,
                    snapshot.len()
                );
                let _ = self.events.send(CacheEvent::Refreshed {
                    key: BOOKS_QUERY_KEY,
                    books: snapshot.clone(),
                });
                Ok(snapshot)
            }
            Err(e) => {
                entry.stale = true;
                drop(entry);

                tracing::warn!("Cache refetch for '{}' failed: {}", BOOKS_QUERY_KEY, e);
                let _ = self.events.send(CacheEvent::RefreshFailed {
                    key: BOOKS_QUERY_KEY,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookPatch, NewBook};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepo {
        books: Mutex<Vec<Book>>,
        fail: AtomicBool,
        list_calls: AtomicUsize,
    }

    impl FakeRepo {
        fn push(&self, id: i32, title: &str) {
            self.books.lock().unwrap().insert(
                0,
                Book {
                    id,
                    isbn: None,
                    title: title.to_string(),
                    author: "Author".to_string(),
                    edition: None,
                    condition: None,
                    notes: None,
                    cover_url: None,
                    added_at: format!("2024-01-{:02}T00:00:00+00:00", id),
                },
            );
        }
    }

    #[async_trait]
    impl BookRepository for FakeRepo {
        async fn list(&self) -> Result<Vec<Book>, DomainError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(DomainError::Database("connection reset".to_string()));
            }
            Ok(self.books.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
            Ok(self.books.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }

        async fn create(&self, _book: NewBook) -> Result<Book, DomainError> {
            Err(DomainError::Internal("not used".to_string()))
        }

        async fn update(&self, _id: i32, _patch: BookPatch) -> Result<Book, DomainError> {
            Err(DomainError::Internal("not used".to_string()))
        }

        async fn delete(&self, id: i32) -> Result<(), DomainError> {
            self.books.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_fetches_once_until_invalidated() {
        let repo = Arc::new(FakeRepo::default());
        repo.push(1, "Dune");
        let cache = BookCache::new(repo.clone());

        assert!(cache.is_stale().await);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 1);

        repo.push(2, "Emma");
        // Still served from cache until invalidated.
        assert_eq!(cache.get().await.unwrap().len(), 1);

        let refreshed = cache.invalidate().await.unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(refreshed[0].title, "Emma");
        assert_eq!(repo.list_calls.load(Ordering::SeqCst), 2);
        assert!(cache.fetched_at().await.is_some());
    }

    #[tokio::test]
    async fn test_subscribers_see_invalidation_then_refresh() {
        let repo = Arc::new(FakeRepo::default());
        repo.push(1, "Dune");
        let cache = BookCache::new(repo.clone());
        let mut table_view = cache.subscribe();
        let mut grid_view = cache.subscribe();
        assert_eq!(cache.subscriber_count(), 2);

        repo.delete(1).await.unwrap();
        cache.invalidate().await.unwrap();

        for rx in [&mut table_view, &mut grid_view] {
            let first = rx.recv().await.unwrap();
            assert_eq!(first.name(), "invalidated");
            match rx.recv().await.unwrap() {
                CacheEvent::Refreshed { key, books } => {
                    assert_eq!(key, BOOKS_QUERY_KEY);
                    assert!(books.is_empty());
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_snapshot() {
        let repo = Arc::new(FakeRepo::default());
        repo.push(1, "Dune");
        let cache = BookCache::new(repo.clone());
        cache.get().await.unwrap();

        repo.fail.store(true, Ordering::SeqCst);
        assert!(cache.invalidate().await.is_err());

        let kept = cache.peek().await.unwrap();
        assert_eq!(kept.len(), 1);
        assert!(cache.is_stale().await);

        repo.fail.store(false, Ordering::SeqCst);
        assert_eq!(cache.get().await.unwrap().len(), 1);
        assert!(!cache.is_stale().await);
    }
}
