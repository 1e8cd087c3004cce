//! In-process [`Store`] backed by ordered maps.
//!
//! All state lives behind one `tokio::sync::Mutex`. Every trait method takes
//! the lock once, so each method is atomic with respect to the others.

use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::Store;
use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticleId, ArticlePatch, CandidateArticle, Note, NoteId};

#[derive(Debug, Default)]
struct Inner {
    articles: BTreeMap<ArticleId, Article>,
    notes: BTreeMap<NoteId, Note>,
    last_article_id: i64,
    last_note_id: i64,
}

/// Process-local [`Store`]; every operation holds one async lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn insert_article_if_absent(&self, candidate: CandidateArticle) -> Result<Option<Article>> {
        let mut inner = self.inner.lock().await;
        if inner.articles.values().any(|a| a.title == candidate.title) {
            return Ok(None);
        }
        inner.last_article_id += 1;
        let id = ArticleId::new(inner.last_article_id);
        let article = Article::from_candidate(id, candidate, Utc::now());
        inner.articles.insert(id, article.clone());
        Ok(Some(article))
    }

    async fn find_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let inner = self.inner.lock().await;
        let all = inner.articles.values();
        let articles = match filter {
            ArticleFilter::All => all.cloned().collect(),
            ArticleFilter::Unsaved => all.filter(|a| !a.saved).cloned().collect(),
            ArticleFilter::Title(title) => all.filter(|a| a.title == title).cloned().collect(),
            ArticleFilter::Saved => {
                let mut saved: Vec<Article> = all.filter(|a| a.saved).cloned().collect();
                saved.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                saved
            }
        };
        Ok(articles)
    }

    async fn get_article(&self, id: ArticleId) -> Result<Option<Article>> {
        Ok(self.inner.lock().await.articles.get(&id).cloned())
    }

    async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>> {
        let mut inner = self.inner.lock().await;
        let Some(article) = inner.articles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(saved) = patch.saved {
            article.saved = saved;
        }
        Ok(Some(article.clone()))
    }

    async fn insert_note(&self, article: ArticleId, body: String) -> Result<Option<Note>> {
        let mut inner = self.inner.lock().await;
        if !inner.articles.contains_key(&article) {
            return Ok(None);
        }
        inner.last_note_id += 1;
        let note = Note {
            id: NoteId::new(inner.last_note_id),
            body,
            article,
            created_at: Utc::now(),
            detached_at: None,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(Some(note))
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self.inner.lock().await.notes.get(&id).cloned())
    }

    async fn delete_note(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self.inner.lock().await.notes.remove(&id))
    }

    async fn notes_for_article(&self, article: ArticleId) -> Result<Vec<Note>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .notes
            .values()
            .filter(|n| n.article == article && n.is_attached())
            .cloned()
            .collect())
    }

    async fn detach_notes(&self, article: ArticleId) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let mut detached = 0;
        for note in inner
            .notes
            .values_mut()
            .filter(|n| n.article == article && n.is_attached())
        {
            note.detached_at = Some(now);
            detached += 1;
        }
        Ok(detached)
    }

    async fn detached_notes(&self) -> Result<Vec<Note>> {
        let inner = self.inner.lock().await;
        Ok(inner.notes.values().filter(|n| !n.is_attached()).cloned().collect())
    }

    async fn delete_detached_notes(&self) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.notes.len();
        inner.notes.retain(|_, n| n.is_attached());
        Ok((before - inner.notes.len()) as u64)
    }
}
