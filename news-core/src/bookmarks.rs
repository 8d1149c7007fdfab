use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::article::Article;
use crate::error::StoreError;

/// Bump when the persisted layout changes. A file carrying another
/// version is discarded and the store starts empty.
const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedArticle {
    article: Article,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    saved: Vec<SavedArticle>,
}

/// Persistent set of bookmarked articles, keyed by URL.
///
/// Handles are cheap to clone and share one underlying store. Rows keep
/// insertion order; overwriting an existing URL keeps its position and
/// original save time. Every committed mutation publishes the full
/// ordered list to [`BookmarkStore::subscribe`] watchers, in commit
/// order. Deleting a bookmark is undone by upserting the identical
/// article again.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    inner: Arc<RwLock<Vec<SavedArticle>>>,
    path: Option<PathBuf>,
    updates: Arc<watch::Sender<Vec<Article>>>,
}

impl BookmarkStore {
    /// A store that never touches disk; for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::with_path(None, Vec::new())
    }

    /// Load persisted bookmarks from `path`. A missing file starts empty;
    /// so does an unreadable one or one written by another store version
    /// (destructive reset, logged).
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let saved = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<StoreFile>(&bytes) {
                Ok(file) if file.version == STORE_VERSION => file.saved,
                Ok(file) => {
                    warn!(
                        found = file.version,
                        expected = STORE_VERSION,
                        "bookmark store version mismatch, starting empty"
                    );
                    Vec::new()
                }
                Err(err) => {
                    warn!(%err, path = %path.display(), "unreadable bookmark store, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self::with_path(Some(path), saved)
    }

    fn with_path(path: Option<PathBuf>, saved: Vec<SavedArticle>) -> Self {
        let initial: Vec<Article> = saved.iter().map(|row| row.article.clone()).collect();
        let (updates, _) = watch::channel(initial);
        Self {
            inner: Arc::new(RwLock::new(saved)),
            path,
            updates: Arc::new(updates),
        }
    }

    /// Insert `article`, or overwrite the stored copy with the same URL.
    pub async fn upsert(&self, article: Article) -> Result<(), StoreError> {
        let mut saved = self.inner.write().await;
        match saved
            .iter_mut()
            .find(|row| row.article.url == article.url)
        {
            Some(existing) => existing.article = article,
            None => saved.push(SavedArticle {
                article,
                saved_at: Utc::now(),
            }),
        }
        self.commit(&saved).await
    }

    /// Remove the bookmark matching `article`'s URL; no-op if absent.
    pub async fn delete(&self, article: &Article) -> Result<(), StoreError> {
        let mut saved = self.inner.write().await;
        let before = saved.len();
        saved.retain(|row| row.article.url != article.url);
        if saved.len() == before {
            debug!(url = %article.url, "delete of unknown bookmark ignored");
            return Ok(());
        }
        self.commit(&saved).await
    }

    /// All bookmarks in insertion order.
    pub async fn list(&self) -> Vec<Article> {
        self.inner
            .read()
            .await
            .iter()
            .map(|row| row.article.clone())
            .collect()
    }

    /// Live view of the bookmark list. The receiver holds the current
    /// list immediately and sees a new value after every committed
    /// mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Article>> {
        self.updates.subscribe()
    }

    /// Persist and publish. Called with the write lock held so commits
    /// land in mutation order.
    async fn commit(&self, saved: &[SavedArticle]) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            let file = StoreFile {
                version: STORE_VERSION,
                saved: saved.to_vec(),
            };
            let bytes = serde_json::to_vec_pretty(&file)?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, path).await?;
        }

        let articles: Vec<Article> = saved.iter().map(|row| row.article.clone()).collect();
        let _ = self.updates.send(articles);
        Ok(())
    }
}
