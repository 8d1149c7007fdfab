use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::feed::{FeedQuery, NewsFeed};

/// Pause after the last keystroke before a search fires.
pub const SEARCH_DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Collapses a burst of keystrokes into one search load.
///
/// Each submission supersedes the previous one. The pending timer task is
/// aborted, and a task that still manages to wake re-checks the
/// generation counter before touching the feed, so a stale query can
/// never fire. The counter carries correctness; the abort is cleanup.
/// A fetch that already left the debounce window is not cancelled.
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Schedule a search for `query`, superseding any pending one.
    /// Queries that trim to nothing are dropped once the delay elapses.
    pub fn submit(&self, feed: Arc<NewsFeed>, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) != generation {
                debug!(generation, "search superseded during debounce");
                return;
            }
            let query = query.trim().to_string();
            if query.is_empty() {
                return;
            }
            feed.load_next(&FeedQuery::Search { query }).await;
        });

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE_DELAY)
    }
}
