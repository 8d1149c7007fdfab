use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::api::NewsApi;
use crate::article::{Article, NewsPage};
use crate::connectivity::Connectivity;
use crate::error::FetchError;
use crate::loadable::Loadable;

/// Articles requested per fetch call.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Offset added to the integer page count (`total_results / page_size`)
/// when deriving the number of the final page. The remote API keeps
/// serving past the integer division; the extra slot covers the trailing
/// partial page.
// TODO: confirm with the API provider that the +2 window holds for page
// sizes other than the default 20.
pub const LAST_PAGE_OFFSET: u32 = 2;

/// Number of the final page for a feed with `total_results` results.
pub fn total_pages(total_results: u64, page_size: u32) -> u32 {
    (total_results / page_size.max(1) as u64) as u32 + LAST_PAGE_OFFSET
}

/// Parameters of one paged article stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    TopHeadlines { country: String },
    Search { query: String },
}

/// Accumulated state of one feed, emitted on every successful merge.
/// Within one feed's lifetime the article list only ever grows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub articles: Vec<Article>,
    pub total_results: u64,
    pub reached_end: bool,
}

/// Cursor and accumulator for one feed. The cursor advances only on a
/// successful merge; pages append in arrival order without deduplication.
#[derive(Debug)]
struct Pager {
    page: u32,
    total_results: u64,
    articles: Vec<Article>,
}

impl Pager {
    fn new() -> Self {
        Self {
            page: 1,
            total_results: 0,
            articles: Vec::new(),
        }
    }

    fn merge(&mut self, response: NewsPage) {
        let first_page = self.page == 1;
        self.page += 1;
        self.total_results = response.total_results;
        if first_page {
            self.articles = response.articles;
        } else {
            self.articles.extend(response.articles);
        }
    }

    fn snapshot(&self, page_size: u32) -> FeedSnapshot {
        FeedSnapshot {
            articles: self.articles.clone(),
            total_results: self.total_results,
            reached_end: self.page == total_pages(self.total_results, page_size),
        }
    }
}

/// Drives paged retrieval of one feed and publishes a single growing
/// article list through a [`Loadable`] event channel.
///
/// At most one load may be outstanding per feed: a `load_next` call that
/// arrives while another is in flight is rejected outright, which also
/// guarantees that page merges apply in the order fetches were issued.
/// Construct one instance per feed (breaking news, search); instances
/// share nothing.
pub struct NewsFeed {
    api: Arc<NewsApi>,
    connectivity: Arc<dyn Connectivity>,
    page_size: u32,
    state: Mutex<Pager>,
    gate: Mutex<()>,
    updates: mpsc::Sender<Loadable<FeedSnapshot>>,
}

impl NewsFeed {
    pub fn new(
        api: Arc<NewsApi>,
        connectivity: Arc<dyn Connectivity>,
        page_size: u32,
        updates: mpsc::Sender<Loadable<FeedSnapshot>>,
    ) -> Self {
        Self {
            api,
            connectivity,
            page_size,
            state: Mutex::new(Pager::new()),
            gate: Mutex::new(()),
            updates,
        }
    }

    /// Current accumulated state, without triggering a fetch.
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.lock().await.snapshot(self.page_size)
    }

    /// Fetch the next page for `query` and merge it into the accumulator.
    ///
    /// Returns `false` when a load is already outstanding; nothing is
    /// emitted in that case. Every accepted call emits `Loading` followed
    /// by exactly one `Ready` or `Failed`. Errors leave the page cursor
    /// and the accumulator untouched; retry is the caller invoking again.
    pub async fn load_next(&self, query: &FeedQuery) -> bool {
        let _outstanding = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(?query, "load rejected, another one is outstanding");
                return false;
            }
        };

        self.emit(Loadable::Loading).await;

        if !self.connectivity.is_online() {
            self.emit(Loadable::failed(FetchError::Offline.to_string()))
                .await;
            return true;
        }

        let page = self.state.lock().await.page;
        let result = match query {
            FeedQuery::TopHeadlines { country } => {
                self.api.top_headlines(country, page, self.page_size).await
            }
            FeedQuery::Search { query } => self.api.search(query, page, self.page_size).await,
        };

        match result {
            Ok(response) => {
                let snapshot = {
                    let mut state = self.state.lock().await;
                    state.merge(response);
                    state.snapshot(self.page_size)
                };
                self.emit(Loadable::Ready(snapshot)).await;
            }
            Err(err) => {
                warn!(%err, ?query, page, "page fetch failed");
                self.emit(Loadable::failed(err.to_string())).await;
            }
        }

        true
    }

    async fn emit(&self, event: Loadable<FeedSnapshot>) {
        if self.updates.send(event).await.is_err() {
            warn!("feed update receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Source;

    fn article(url: &str) -> Article {
        Article {
            source: Source {
                id: None,
                name: "test".into(),
            },
            title: url.to_string(),
            description: None,
            url: url.into(),
            url_to_image: None,
            published_at: None,
        }
    }

    fn page_of(total_results: u64, urls: &[&str]) -> NewsPage {
        NewsPage {
            status: "ok".into(),
            total_results,
            articles: urls.iter().map(|url| article(url)).collect(),
        }
    }

    #[test]
    fn last_page_threshold_uses_integer_division_plus_offset() {
        // 45 results at page size 20: 45 / 20 = 2, final page number 4.
        assert_eq!(total_pages(45, 20), 4);
        assert_eq!(total_pages(0, 20), LAST_PAGE_OFFSET);
        assert_eq!(total_pages(40, 20), 4);
    }

    #[test]
    fn merge_appends_in_arrival_order() {
        let mut pager = Pager::new();

        pager.merge(page_of(45, &["u1", "u2"]));
        assert_eq!(pager.page, 2);
        assert_eq!(pager.articles.len(), 2);

        pager.merge(page_of(45, &["u3"]));
        assert_eq!(pager.page, 3);
        let urls: Vec<&str> = pager.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, ["u1", "u2", "u3"]);
    }

    #[test]
    fn duplicate_urls_across_pages_are_kept() {
        let mut pager = Pager::new();
        pager.merge(page_of(45, &["u1"]));
        pager.merge(page_of(45, &["u1"]));
        assert_eq!(pager.articles.len(), 2);
    }

    #[test]
    fn reached_end_flips_exactly_at_the_threshold() {
        let mut pager = Pager::new();

        pager.merge(page_of(45, &["u1"]));
        assert!(!pager.snapshot(20).reached_end); // page now 2 of 4

        pager.merge(page_of(45, &["u2"]));
        assert!(!pager.snapshot(20).reached_end); // page now 3 of 4

        pager.merge(page_of(45, &["u3"]));
        assert!(pager.snapshot(20).reached_end); // page now 4 of 4
    }

    #[test]
    fn first_merge_replaces_even_an_empty_page() {
        let mut pager = Pager::new();
        pager.merge(page_of(45, &[]));
        assert_eq!(pager.page, 2);

        pager.merge(page_of(45, &["u1"]));
        assert_eq!(pager.articles.len(), 1);
    }
}
