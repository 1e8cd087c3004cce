//! Commit-once reconciliation of extracted candidates.
//!
//! Candidates are processed one at a time in document order. For each one
//! the store is asked to commit it unless an article with the same title
//! already exists; duplicates are dropped silently, never merged. Empty
//! titles are treated like any other title, so they collapse into a single
//! slot.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::models::CandidateArticle;
use crate::store::Store;
use crate::utils::truncate_for_log;

/// Outcome counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub candidates: usize,
    pub committed: usize,
    pub duplicates: usize,
    /// Candidates whose insert failed in the store.
    pub failed: usize,
}

enum Outcome {
    Committed,
    Duplicate,
    Failed,
}

/// Commits candidates into a borrowed [`Store`], at most once per title.
pub struct Reconciler<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Commit every candidate whose title is not yet stored.
    ///
    /// A store failure on one candidate is logged and counted; later
    /// candidates are still attempted.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub async fn reconcile(&self, candidates: Vec<CandidateArticle>) -> ReconcileReport {
        let total = candidates.len();
        let outcomes: Vec<Outcome> = stream::iter(candidates)
            .then(|candidate| async move {
                let title = candidate.title.clone();
                match self.store.insert_article_if_absent(candidate).await {
                    Ok(Some(article)) => {
                        debug!(id = %article.id, title = %truncate_for_log(&title, 80), "Committed article");
                        Outcome::Committed
                    }
                    Ok(None) => {
                        debug!(title = %truncate_for_log(&title, 80), "Duplicate title; discarded");
                        Outcome::Duplicate
                    }
                    Err(e) => {
                        warn!(error = %e, title = %truncate_for_log(&title, 80), "Failed to commit candidate");
                        Outcome::Failed
                    }
                }
            })
            .collect()
            .await;

        let mut report = ReconcileReport {
            candidates: total,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Committed => report.committed += 1,
                Outcome::Duplicate => report.duplicates += 1,
                Outcome::Failed => report.failed += 1,
            }
        }

        info!(
            committed = report.committed,
            duplicates = report.duplicates,
            failed = report.failed,
            "Reconciliation finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleFilter;
    use crate::store::{MemoryStore, SqliteStore};

    fn candidates(titles: &[&str]) -> Vec<CandidateArticle> {
        titles
            .iter()
            .map(|t| CandidateArticle {
                title: t.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_second_pass_commits_nothing() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store);
        let batch = candidates(&["A", "B", "C"]);

        let first = reconciler.reconcile(batch.clone()).await;
        let second = reconciler.reconcile(batch).await;

        assert_eq!(first.committed, 3);
        assert_eq!(second.committed, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(store.find_articles(ArticleFilter::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_second_pass_commits_nothing_sqlite() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let reconciler = Reconciler::new(&store);
        let batch = candidates(&["A", "B", "A", "C"]);

        let first = reconciler.reconcile(batch.clone()).await;
        let second = reconciler.reconcile(batch).await;

        assert_eq!(first.committed, 3);
        assert_eq!(first.duplicates, 1);
        assert_eq!(second.committed, 0);
        assert_eq!(store.find_articles(ArticleFilter::All).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_in_batch_duplicates_keep_first() {
        let store = MemoryStore::new();
        let mut batch = candidates(&["Same", "Same"]);
        batch[0].summary = Some("first".to_string());
        batch[1].summary = Some("second".to_string());

        let report = Reconciler::new(&store).reconcile(batch).await;
        assert_eq!(report.committed, 1);
        assert_eq!(report.duplicates, 1);

        let stored = store.find_articles(ArticleFilter::All).await.unwrap();
        assert_eq!(stored[0].summary.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_empty_titles_collapse_to_one_slot() {
        let store = MemoryStore::new();
        let report = Reconciler::new(&store)
            .reconcile(candidates(&["", "", "Real", ""]))
            .await;

        assert_eq!(report.committed, 2);
        assert_eq!(report.duplicates, 2);
    }

    #[tokio::test]
    async fn test_overlapping_passes_commit_each_title_once() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store);
        let batch = candidates(&["A", "B", "C", "D"]);

        let (left, right) = tokio::join!(
            reconciler.reconcile(batch.clone()),
            reconciler.reconcile(batch.clone())
        );

        assert_eq!(left.committed + right.committed, 4);
        assert_eq!(store.find_articles(ArticleFilter::All).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = MemoryStore::new();
        let report = Reconciler::new(&store).reconcile(Vec::new()).await;
        assert_eq!(report, ReconcileReport::default());
    }
}
