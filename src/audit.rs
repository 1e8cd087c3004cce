//! Integrity audit over the stored articles and notes.
//!
//! Reports what the commit-once and attach/detach rules are meant to
//! prevent or leave behind: articles sharing a title (possible in stores
//! written before the title constraint existed) and notes detached by an
//! unsave. Pruning hard-deletes the detached notes.

use itertools::Itertools;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::models::{ArticleFilter, ArticleId, NoteId};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateTitle {
    pub title: String,
    pub ids: Vec<ArticleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub articles: usize,
    pub duplicate_titles: Vec<DuplicateTitle>,
    pub detached_notes: Vec<NoteId>,
    /// Detached notes removed by this run; zero unless pruning was requested.
    pub pruned: u64,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_titles.is_empty() && self.detached_notes.is_empty()
    }
}

#[instrument(level = "info", skip(store))]
pub async fn audit<S: Store>(store: &S, prune: bool) -> Result<AuditReport> {
    let articles = store.find_articles(ArticleFilter::All).await?;
    let duplicate_titles: Vec<DuplicateTitle> = articles
        .iter()
        .into_group_map_by(|a| a.title.clone())
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(title, group)| DuplicateTitle {
            title,
            ids: group.iter().map(|a| a.id).sorted().collect(),
        })
        .sorted_by(|a, b| a.title.cmp(&b.title))
        .collect();

    for dup in &duplicate_titles {
        warn!(title = %dup.title, count = dup.ids.len(), "Duplicate title");
    }

    let detached_notes: Vec<NoteId> = store.detached_notes().await?.into_iter().map(|n| n.id).collect();
    let pruned = if prune && !detached_notes.is_empty() {
        store.delete_detached_notes().await?
    } else {
        0
    };

    info!(
        articles = articles.len(),
        duplicates = duplicate_titles.len(),
        detached = detached_notes.len(),
        pruned,
        "Audit finished"
    );

    Ok(AuditReport {
        articles: articles.len(),
        duplicate_titles,
        detached_notes,
        pruned,
    })
}
