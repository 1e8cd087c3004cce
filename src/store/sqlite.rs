//! SQLite-backed [`Store`].
//!
//! Queries run on the `tokio-rusqlite` background thread, so callers only
//! ever await. Multi-statement operations run inside one transaction.
//!
//! Title uniqueness is normally a unique index. A database that already holds
//! duplicate titles cannot take that index; it still opens, and commit-once
//! falls back to a title check and insert inside one immediate transaction.
//! `scrape_news audit` lists the duplicates.

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension, Params, Row, TransactionBehavior, params};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::{debug, instrument, warn};

use super::Store;
use super::schema::{SCHEMA, TITLE_INDEX};
use crate::error::Result;
use crate::models::{Article, ArticleFilter, ArticleId, ArticlePatch, CandidateArticle, Note, NoteId};

const ARTICLE_COLUMNS: &str = "id, title, summary, link, img, saved, created_at";
const NOTE_COLUMNS: &str = "id, article_id, body, created_at, detached_at";

/// [`Store`] backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
    /// Whether `idx_articles_title` exists. False only for a database
    /// holding duplicate titles from before the index.
    title_unique: bool,
}

impl SqliteStore {
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).await?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        let title_unique = conn
            .call(|conn| {
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                conn.execute_batch(SCHEMA)?;
                match conn.execute_batch(TITLE_INDEX) {
                    Ok(()) => Ok(true),
                    Err(rusqlite::Error::SqliteFailure(e, _))
                        if e.code == ErrorCode::ConstraintViolation =>
                    {
                        Ok(false)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;
        if title_unique {
            debug!("Schema ready");
        } else {
            warn!("Database holds duplicate titles; run `scrape_news audit` to list them");
        }
        Ok(Self { conn, title_unique })
    }

    /// Whether the database enforces title uniqueness with an index.
    pub fn title_unique(&self) -> bool {
        self.title_unique
    }
}

impl Store for SqliteStore {
    async fn insert_article_if_absent(&self, candidate: CandidateArticle) -> Result<Option<Article>> {
        let created_at = Utc::now();
        let title_unique = self.title_unique;
        let article = self
            .conn
            .call(move |conn| {
                if title_unique {
                    let inserted = conn.execute(
                        r#"INSERT INTO articles (title, summary, link, img, saved, created_at)
                           VALUES (?1, ?2, ?3, ?4, 0, ?5)
                           ON CONFLICT(title) DO NOTHING"#,
                        params![
                            candidate.title,
                            candidate.summary,
                            candidate.link,
                            candidate.img,
                            created_at,
                        ],
                    )?;
                    if inserted == 0 {
                        return Ok(None);
                    }
                    let id = ArticleId::new(conn.last_insert_rowid());
                    return Ok(Some(Article::from_candidate(id, candidate, created_at)));
                }

                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let taken = tx
                    .query_row(
                        "SELECT 1 FROM articles WHERE title = ?1 LIMIT 1",
                        params![candidate.title],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                if taken {
                    return Ok(None);
                }
                tx.execute(
                    r#"INSERT INTO articles (title, summary, link, img, saved, created_at)
                       VALUES (?1, ?2, ?3, ?4, 0, ?5)"#,
                    params![
                        candidate.title,
                        candidate.summary,
                        candidate.link,
                        candidate.img,
                        created_at,
                    ],
                )?;
                let id = ArticleId::new(tx.last_insert_rowid());
                tx.commit()?;
                Ok(Some(Article::from_candidate(id, candidate, created_at)))
            })
            .await?;
        Ok(article)
    }

    async fn find_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(move |conn| {
                let articles = match filter {
                    ArticleFilter::All => query_articles(conn, "ORDER BY id", [])?,
                    ArticleFilter::Unsaved => {
                        query_articles(conn, "WHERE saved = 0 ORDER BY id", [])?
                    }
                    ArticleFilter::Saved => query_articles(
                        conn,
                        "WHERE saved = 1 ORDER BY created_at DESC, id DESC",
                        [],
                    )?,
                    ArticleFilter::Title(title) => {
                        query_articles(conn, "WHERE title = ?1 ORDER BY id", params![title])?
                    }
                };
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    async fn get_article(&self, id: ArticleId) -> Result<Option<Article>> {
        let article = self
            .conn
            .call(move |conn| Ok(article_by_id(conn, id)?))
            .await?;
        Ok(article)
    }

    async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>> {
        let article = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                if let Some(saved) = patch.saved {
                    tx.execute(
                        "UPDATE articles SET saved = ?1 WHERE id = ?2",
                        params![saved, id.get()],
                    )?;
                }
                let article = article_by_id(&tx, id)?;
                tx.commit()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }

    async fn insert_note(&self, article: ArticleId, body: String) -> Result<Option<Note>> {
        let created_at = Utc::now();
        let note = self
            .conn
            .call(move |conn| {
                let inserted = conn.execute(
                    r#"INSERT INTO notes (article_id, body, created_at)
                       SELECT ?1, ?2, ?3
                       WHERE EXISTS (SELECT 1 FROM articles WHERE id = ?1)"#,
                    params![article.get(), body, created_at],
                )?;
                if inserted == 0 {
                    return Ok(None);
                }
                Ok(Some(Note {
                    id: NoteId::new(conn.last_insert_rowid()),
                    body,
                    article,
                    created_at,
                    detached_at: None,
                }))
            })
            .await?;
        Ok(note)
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        let note = self
            .conn
            .call(move |conn| Ok(note_by_id(conn, id)?))
            .await?;
        Ok(note)
    }

    async fn delete_note(&self, id: NoteId) -> Result<Option<Note>> {
        let note = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let note = note_by_id(&tx, id)?;
                if note.is_some() {
                    tx.execute("DELETE FROM notes WHERE id = ?1", params![id.get()])?;
                }
                tx.commit()?;
                Ok(note)
            })
            .await?;
        Ok(note)
    }

    async fn notes_for_article(&self, article: ArticleId) -> Result<Vec<Note>> {
        let notes = self
            .conn
            .call(move |conn| {
                Ok(query_notes(
                    conn,
                    "WHERE article_id = ?1 AND detached_at IS NULL ORDER BY id",
                    params![article.get()],
                )?)
            })
            .await?;
        Ok(notes)
    }

    async fn detach_notes(&self, article: ArticleId) -> Result<u64> {
        let now = Utc::now();
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE notes SET detached_at = ?1 WHERE article_id = ?2 AND detached_at IS NULL",
                    params![now, article.get()],
                )?;
                Ok(changed as u64)
            })
            .await?;
        Ok(changed)
    }

    async fn detached_notes(&self) -> Result<Vec<Note>> {
        let notes = self
            .conn
            .call(|conn| Ok(query_notes(conn, "WHERE detached_at IS NOT NULL ORDER BY id", [])?))
            .await?;
        Ok(notes)
    }

    async fn delete_detached_notes(&self) -> Result<u64> {
        let removed = self
            .conn
            .call(|conn| {
                let removed = conn.execute("DELETE FROM notes WHERE detached_at IS NOT NULL", [])?;
                Ok(removed as u64)
            })
            .await?;
        Ok(removed)
    }
}

fn query_articles<P: Params>(
    conn: &rusqlite::Connection,
    clause: &str,
    params: P,
) -> rusqlite::Result<Vec<Article>> {
    let mut stmt = conn.prepare(&format!("SELECT {ARTICLE_COLUMNS} FROM articles {clause}"))?;
    let articles = stmt
        .query_map(params, article_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(articles)
}

fn query_notes<P: Params>(
    conn: &rusqlite::Connection,
    clause: &str,
    params: P,
) -> rusqlite::Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes {clause}"))?;
    let notes = stmt
        .query_map(params, note_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

fn article_by_id(conn: &rusqlite::Connection, id: ArticleId) -> rusqlite::Result<Option<Article>> {
    conn.query_row(
        &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
        params![id.get()],
        article_from_row,
    )
    .optional()
}

fn note_by_id(conn: &rusqlite::Connection, id: NoteId) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1"),
        params![id.get()],
        note_from_row,
    )
    .optional()
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: ArticleId::new(row.get(0)?),
        title: row.get(1)?,
        summary: row.get(2)?,
        link: row.get(3)?,
        img: row.get(4)?,
        saved: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: NoteId::new(row.get(0)?),
        article: ArticleId::new(row.get(1)?),
        body: row.get(2)?,
        created_at: row.get(3)?,
        detached_at: row.get(4)?,
    })
}
