//! Persistence for articles and notes.
//!
//! Components never reach for a global connection; they are handed a
//! [`Store`] explicitly. Two implementations exist:
//!
//! - [`MemoryStore`]: process-local maps behind one async mutex
//! - [`SqliteStore`]: a SQLite file driven through `tokio-rusqlite`
//!
//! # Commit-once
//!
//! [`Store::insert_article_if_absent`] is a single storage operation: the
//! title check and the insert cannot interleave with another writer. The
//! memory store holds its lock across both steps; SQLite enforces a
//! `UNIQUE(title)` constraint.
//!
//! # Notes
//!
//! A note's `article` field is the only link between the two sets.
//! [`Store::notes_for_article`] resolves an article's list at read time from
//! the attached notes naming it, so there is no second copy to drift.

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticleId, ArticlePatch, CandidateArticle, Note, NoteId};

/// Article and note persistence.
///
/// Lookups return `Ok(None)` for unknown ids; turning that into
/// [`crate::AppError::NotFound`] is the caller's decision.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Commit `candidate` unless an article with the same title exists.
    ///
    /// Returns the new article, or `None` when the title was already taken.
    async fn insert_article_if_absent(&self, candidate: CandidateArticle) -> Result<Option<Article>>;

    /// Articles matching `filter`. Saved articles come newest first; every
    /// other filter returns commit order.
    async fn find_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>>;

    async fn get_article(&self, id: ArticleId) -> Result<Option<Article>>;

    /// Apply `patch` and return the updated article, or `None` if `id` is unknown.
    async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>>;

    /// Create a note on `article`. Returns `None`, creating nothing, if the
    /// article does not exist.
    async fn insert_note(&self, article: ArticleId, body: String) -> Result<Option<Note>>;

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>>;

    /// Remove a note and return it, or `None` if `id` is unknown.
    async fn delete_note(&self, id: NoteId) -> Result<Option<Note>>;

    /// Attached notes of `article`, oldest first.
    async fn notes_for_article(&self, article: ArticleId) -> Result<Vec<Note>>;

    /// Mark every attached note of `article` as detached. Returns how many changed.
    async fn detach_notes(&self, article: ArticleId) -> Result<u64>;

    /// Notes detached by an unsave and not yet pruned, oldest first.
    async fn detached_notes(&self) -> Result<Vec<Note>>;

    /// Hard-delete every detached note. Returns how many were removed.
    async fn delete_detached_notes(&self) -> Result<u64>;
}
