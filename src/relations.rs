//! Article/note relations: saving, unsaving, and note management.
//!
//! Notes carry the only link to their article. An article's note list is
//! resolved at read time from its attached notes, so creating or deleting a
//! note is a single storage operation and the list cannot drift.
//!
//! Unsaving an article detaches its notes instead of deleting them: each
//! note stays retrievable by id and keeps naming the article, but drops out
//! of the article's list. [`crate::audit`] can prune detached notes.

use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::models::{Article, ArticleFilter, ArticleId, ArticlePatch, ArticleWithNotes, Note, NoteId};
use crate::store::Store;

/// Article and note operations over a borrowed [`Store`].
pub struct Relations<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> Relations<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Mark an article saved. Its notes are left as they are.
    #[instrument(level = "info", skip(self))]
    pub async fn save_article(&self, id: ArticleId) -> Result<Article> {
        let article = self
            .store
            .update_article(id, ArticlePatch::saved(true))
            .await?
            .ok_or_else(|| AppError::not_found("article", id))?;
        info!("Article saved");
        Ok(article)
    }

    /// Mark the article unsaved and detach all of its notes.
    #[instrument(level = "info", skip(self))]
    pub async fn unsave_article(&self, id: ArticleId) -> Result<Article> {
        let article = self
            .store
            .update_article(id, ArticlePatch::saved(false))
            .await?
            .ok_or_else(|| AppError::not_found("article", id))?;

        match self.store.detach_notes(id).await {
            Ok(detached) => info!(detached, "Article unsaved"),
            Err(e) => {
                warn!(error = %e, "Article unsaved but its notes are still attached");
                return Err(e);
            }
        }
        Ok(article)
    }

    /// Attach a new note to `article`.
    ///
    /// # Arguments
    ///
    /// * `article` - The article the note belongs to
    /// * `body` - Note text; stored as given, but must not be blank
    ///
    /// # Returns
    ///
    /// The created note, [`AppError::InvalidInput`] for a blank body, or
    /// [`AppError::NotFound`] when the article does not exist.
    #[instrument(level = "info", skip(self, body))]
    pub async fn add_note(&self, article: ArticleId, body: impl Into<String>) -> Result<Note> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(AppError::InvalidInput("note body must not be blank".to_string()));
        }
        let note = self
            .store
            .insert_note(article, body)
            .await?
            .ok_or_else(|| AppError::not_found("article", article))?;
        info!(note = %note.id, "Note added");
        Ok(note)
    }

    /// Delete a note.
    ///
    /// `article` is the caller's claim about the owner. It is not used to
    /// locate the note; a mismatch is logged and the delete still succeeds.
    #[instrument(level = "info", skip(self))]
    pub async fn delete_note(&self, note: NoteId, article: ArticleId) -> Result<Note> {
        let deleted = self
            .store
            .delete_note(note)
            .await?
            .ok_or_else(|| AppError::not_found("note", note))?;

        if deleted.article != article {
            warn!(
                owner = %deleted.article,
                claimed = %article,
                "Deleted note belonged to a different article"
            );
        }
        info!("Note deleted");
        Ok(deleted)
    }

    pub async fn note(&self, id: NoteId) -> Result<Note> {
        self.store
            .get_note(id)
            .await?
            .ok_or_else(|| AppError::not_found("note", id))
    }

    /// One article with its attached notes populated.
    pub async fn article_with_notes(&self, id: ArticleId) -> Result<ArticleWithNotes> {
        let article = self
            .store
            .get_article(id)
            .await?
            .ok_or_else(|| AppError::not_found("article", id))?;
        let notes = self.store.notes_for_article(id).await?;
        Ok(ArticleWithNotes { article, notes })
    }

    pub async fn list(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        self.store.find_articles(filter).await
    }

    /// Every article with its notes, in commit order.
    pub async fn all_with_notes(&self) -> Result<Vec<ArticleWithNotes>> {
        let articles = self.store.find_articles(ArticleFilter::All).await?;
        futures::future::try_join_all(articles.into_iter().map(|article| async move {
            let notes = self.store.notes_for_article(article.id).await?;
            Ok::<_, AppError>(ArticleWithNotes { article, notes })
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateArticle;
    use crate::store::{MemoryStore, SqliteStore};

    async fn seed<S: Store>(store: &S, title: &str) -> ArticleId {
        store
            .insert_article_if_absent(CandidateArticle {
                title: title.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_note_roundtrip() {
        let store = MemoryStore::new();
        let a = seed(&store, "A").await;
        let relations = Relations::new(&store);

        relations.add_note(a, "hello").await.unwrap();
        let populated = relations.article_with_notes(a).await.unwrap();

        assert_eq!(populated.notes.len(), 1);
        assert_eq!(populated.notes[0].body, "hello");
        assert_eq!(populated.notes[0].article, a);
    }

    #[tokio::test]
    async fn test_unsave_detaches_but_keeps_notes() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let a = seed(&store, "A").await;
        let relations = Relations::new(&store);

        relations.save_article(a).await.unwrap();
        let mut ids = Vec::new();
        for body in ["one", "two", "three"] {
            ids.push(relations.add_note(a, body).await.unwrap().id);
        }

        let article = relations.unsave_article(a).await.unwrap();
        assert!(!article.saved);

        let populated = relations.article_with_notes(a).await.unwrap();
        assert!(populated.notes.is_empty());
        assert!(!populated.article.saved);

        for id in ids {
            let note = relations.note(id).await.unwrap();
            assert_eq!(note.article, a);
            assert!(!note.is_attached());
        }
    }

    #[tokio::test]
    async fn test_blank_note_body_is_rejected() {
        let store = MemoryStore::new();
        let a = seed(&store, "A").await;
        let relations = Relations::new(&store);

        for body in ["", "   ", "\n\t"] {
            let err = relations.add_note(a, body).await.unwrap_err();
            assert_eq!(err.kind(), "invalid_input");
        }
        assert!(relations.article_with_notes(a).await.unwrap().notes.is_empty());

        let note = relations.add_note(a, "  padded  ").await.unwrap();
        assert_eq!(note.body, "  padded  ");
    }

    #[tokio::test]
    async fn test_save_does_not_touch_notes() {
        let store = MemoryStore::new();
        let a = seed(&store, "A").await;
        let relations = Relations::new(&store);
        relations.add_note(a, "kept").await.unwrap();

        let article = relations.save_article(a).await.unwrap();
        assert!(article.saved);
        assert_eq!(relations.article_with_notes(a).await.unwrap().notes.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_note_removes_it_everywhere() {
        let store = MemoryStore::new();
        let a = seed(&store, "A").await;
        let relations = Relations::new(&store);
        let keep = relations.add_note(a, "keep").await.unwrap();
        let gone = relations.add_note(a, "gone").await.unwrap();

        relations.delete_note(gone.id, a).await.unwrap();

        let notes = relations.article_with_notes(a).await.unwrap().notes;
        assert_eq!(notes, vec![keep]);
        let err = relations.note(gone.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "note", .. }));
    }

    #[tokio::test]
    async fn test_mismatched_delete_leaves_no_dangling_reference() {
        let store = MemoryStore::new();
        let a1 = seed(&store, "A1").await;
        let a2 = seed(&store, "A2").await;
        let relations = Relations::new(&store);
        let note = relations.add_note(a1, "on a1").await.unwrap();

        let deleted = relations.delete_note(note.id, a2).await.unwrap();
        assert_eq!(deleted.article, a1);

        assert!(relations.note(note.id).await.is_err());
        assert!(relations.article_with_notes(a1).await.unwrap().notes.is_empty());
        assert!(relations.article_with_notes(a2).await.unwrap().notes.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = MemoryStore::new();
        let relations = Relations::new(&store);
        let missing = ArticleId::new(77);

        for err in [
            relations.save_article(missing).await.unwrap_err(),
            relations.unsave_article(missing).await.unwrap_err(),
            relations.add_note(missing, "x").await.unwrap_err(),
            relations.article_with_notes(missing).await.unwrap_err(),
            relations.delete_note(NoteId::new(1), missing).await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), "not_found");
        }
        assert!(store.detached_notes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_with_notes() {
        let store = MemoryStore::new();
        let a = seed(&store, "A").await;
        seed(&store, "B").await;
        let relations = Relations::new(&store);
        relations.add_note(a, "n").await.unwrap();

        let all = relations.all_with_notes().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].notes.len(), 1);
        assert!(all[1].notes.is_empty());
    }
}
