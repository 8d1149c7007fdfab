use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task;
use tracing::{debug, warn};

use crate::article::Article;

/// One step of an edit script produced by [`diff`].
///
/// Scripts apply sequentially to a working copy of the old list: removals
/// first (indices into the shrinking list, emitted high-to-low), then
/// insertions (indices into the final list, emitted low-to-high), then
/// in-place updates at final positions. [`apply`] is the reference
/// interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOp {
    Remove { index: usize },
    Insert { index: usize, article: Article },
    Update { index: usize, article: Article },
}

/// Keyed diff between the currently rendered list and a new one.
///
/// Rows are identified by URL; a row present on both sides with any field
/// changed yields a single `Update`, never a remove/insert pair. A row
/// whose relative order changed surfaces as remove+insert (move detection
/// is off). The inputs may be completely unrelated lists; switching a
/// screen from one feed to another is an ordinary call.
pub fn diff(old: &[Article], new: &[Article]) -> Vec<ListOp> {
    let matched = lcs_by_url(old, new);

    let matched_old: HashSet<usize> = matched.iter().map(|&(o, _)| o).collect();
    let matched_new: HashSet<usize> = matched.iter().map(|&(_, n)| n).collect();

    let mut ops = Vec::new();

    for index in (0..old.len()).rev() {
        if !matched_old.contains(&index) {
            ops.push(ListOp::Remove { index });
        }
    }
    for (index, article) in new.iter().enumerate() {
        if !matched_new.contains(&index) {
            ops.push(ListOp::Insert {
                index,
                article: article.clone(),
            });
        }
    }
    for &(o, n) in &matched {
        if old[o] != new[n] {
            ops.push(ListOp::Update {
                index: n,
                article: new[n].clone(),
            });
        }
    }

    ops
}

/// Longest common subsequence over article URLs, classic quadratic table.
/// Inputs are page accumulations of at most a few hundred rows, and
/// callers run the computation off the rendering path.
fn lcs_by_url(old: &[Article], new: &[Article]) -> Vec<(usize, usize)> {
    let mut table = vec![vec![0u32; new.len() + 1]; old.len() + 1];
    for o in (0..old.len()).rev() {
        for n in (0..new.len()).rev() {
            table[o][n] = if old[o].url == new[n].url {
                table[o + 1][n + 1] + 1
            } else {
                table[o + 1][n].max(table[o][n + 1])
            };
        }
    }

    let (mut o, mut n) = (0, 0);
    let mut pairs = Vec::new();
    while o < old.len() && n < new.len() {
        if old[o].url == new[n].url {
            pairs.push((o, n));
            o += 1;
            n += 1;
        } else if table[o + 1][n] >= table[o][n + 1] {
            o += 1;
        } else {
            n += 1;
        }
    }
    pairs
}

/// Apply `ops` to `old` and return the resulting list. Serves as the
/// reference semantics of an edit script; UI layers translate the same
/// ops into their own row mutations.
pub fn apply(old: &[Article], ops: &[ListOp]) -> Vec<Article> {
    let mut list = old.to_vec();
    for op in ops {
        match op {
            ListOp::Remove { index } => {
                list.remove(*index);
            }
            ListOp::Insert { index, article } => list.insert(*index, article.clone()),
            ListOp::Update { index, article } => list[*index] = article.clone(),
        }
    }
    list
}

/// The edit script for one accepted submission plus the list it produces.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub ops: Vec<ListOp>,
    pub list: Vec<Article>,
}

/// Runs [`diff`] off the caller's path and keeps results in submission
/// order: a computation that finishes after a newer submission exists is
/// dropped, so the emitted script always transforms the list a subscriber
/// last received.
pub struct Reconciler {
    current: Arc<Mutex<Vec<Article>>>,
    generation: Arc<AtomicU64>,
    updates: mpsc::Sender<Reconciliation>,
}

impl Reconciler {
    pub fn new(updates: mpsc::Sender<Reconciliation>) -> Self {
        Self {
            current: Arc::new(Mutex::new(Vec::new())),
            generation: Arc::new(AtomicU64::new(0)),
            updates,
        }
    }

    /// Schedule reconciliation of the applied list against `new_list`.
    /// Supersedes any still-running submission.
    pub fn submit(&self, new_list: Vec<Article>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.current);
        let latest = Arc::clone(&self.generation);
        let updates = self.updates.clone();

        tokio::spawn(async move {
            let old = current.lock().await.clone();
            let target = new_list.clone();
            let ops = match task::spawn_blocking(move || diff(&old, &target)).await {
                Ok(ops) => ops,
                Err(err) => {
                    warn!(%err, "diff computation task failed");
                    return;
                }
            };

            let mut applied = current.lock().await;
            if latest.load(Ordering::SeqCst) != generation {
                debug!(generation, "reconciliation superseded, dropping result");
                return;
            }
            *applied = new_list.clone();
            drop(applied);

            if updates.send(Reconciliation { ops, list: new_list }).await.is_err() {
                warn!("reconciliation receiver dropped");
            }
        });
    }
}
