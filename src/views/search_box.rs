//! Search box state with debounced URL synchronisation.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs the most recently scheduled action after a quiet period. Scheduling
/// again before the delay elapses aborts the pending action.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// URL for `path` carrying the search query, or the bare path when blank.
pub fn search_url(path: &str, query: &str) -> String {
    let q = query.trim();
    if q.is_empty() {
        path.to_string()
    } else {
        format!("{}?q={}", path, urlencoding::encode(q))
    }
}

/// The collection search box. The query applies to the views immediately;
/// the address-bar URL follows after the debounce delay.
pub struct SearchBox {
    path: String,
    query: String,
    url: Arc<watch::Sender<String>>,
    debouncer: Debouncer,
}

impl SearchBox {
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_delay(path, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(path: impl Into<String>, delay: Duration) -> Self {
        let path = path.into();
        let (tx, _) = watch::channel(path.clone());
        Self {
            path,
            query: String::new(),
            url: Arc::new(tx),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Last URL published to subscribers.
    pub fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    pub fn subscribe_url(&self) -> watch::Receiver<String> {
        self.url.subscribe()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        let next = search_url(&self.path, &self.query);
        let tx = self.url.clone();
        self.debouncer.schedule(async move {
            tx.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    tracing::debug!("Search URL -> {}", next);
                    *current = next;
                    true
                }
            });
        });
    }

    pub fn is_sync_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
