//! Data models for scraped articles and the notes attached to them.
//!
//! This module defines the records that flow through the crate:
//! - [`CandidateArticle`]: an extracted, not-yet-persisted article
//! - [`Article`]: a committed article, keyed by [`ArticleId`]
//! - [`Note`]: free-text annotation owned by exactly one article
//! - [`ArticleWithNotes`]: an article with its notes populated
//!
//! Notes hold the only link between the two entity sets. An article's note
//! list is never stored; it is resolved from the notes that name it and are
//! still attached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a stored article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(i64);

impl ArticleId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ArticleId> for i64 {
    fn from(id: ArticleId) -> Self {
        id.0
    }
}

/// Unique identifier for a stored note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NoteId> for i64 {
    fn from(id: NoteId) -> Self {
        id.0
    }
}

/// An article as extracted from the index page, before reconciliation.
///
/// `title` is always present (possibly empty) because it is the dedup key.
/// The other fields are omitted from serialized output when the page did
/// not provide them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// A committed article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub saved: bool,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Build the stored form of a candidate. New articles are never saved.
    pub fn from_candidate(id: ArticleId, candidate: CandidateArticle, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: candidate.title,
            summary: candidate.summary,
            link: candidate.link,
            img: candidate.img,
            saved: false,
            created_at,
        }
    }
}

/// A free-text note on an article.
///
/// `detached_at` is set when the owning article is unsaved: the note keeps
/// its `article` reference and stays retrievable by id, but no longer shows
/// up in the article's note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub body: String,
    pub article: ArticleId,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detached_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn is_attached(&self) -> bool {
        self.detached_at.is_none()
    }
}

/// An article with its attached notes populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleWithNotes {
    #[serde(flatten)]
    pub article: Article,
    pub notes: Vec<Note>,
}

/// Equality filters supported by [`crate::store::Store::find_articles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleFilter {
    /// Every article, in commit order.
    All,
    /// Saved articles, newest first.
    Saved,
    /// Articles not yet saved, in commit order.
    Unsaved,
    /// Articles whose title equals the given string exactly.
    Title(String),
}

/// Partial update applied by [`crate::store::Store::update_article`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub saved: Option<bool>,
}

impl ArticlePatch {
    pub fn saved(saved: bool) -> Self {
        Self { saved: Some(saved) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_omits_absent_fields() {
        let candidate = CandidateArticle {
            title: "World Leaders Meet".to_string(),
            img: Some("/img/a.jpg".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["title"], "World Leaders Meet");
        assert_eq!(json["img"], "/img/a.jpg");
        assert!(json.get("summary").is_none());
        assert!(json.get("link").is_none());
    }

    #[test]
    fn test_ids_serialize_as_raw_integers() {
        assert_eq!(serde_json::to_string(&ArticleId::new(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&NoteId::new(9)).unwrap(), "9");
    }

    #[test]
    fn test_from_candidate_starts_unsaved() {
        let candidate = CandidateArticle {
            title: "Title".to_string(),
            summary: Some("Summary".to_string()),
            link: Some("https://example.com/a".to_string()),
            img: None,
        };
        let article = Article::from_candidate(ArticleId::new(1), candidate, Utc::now());

        assert!(!article.saved);
        assert_eq!(article.title, "Title");
        assert_eq!(article.summary.as_deref(), Some("Summary"));
    }

    #[test]
    fn test_article_with_notes_flattens_article_fields() {
        let now = Utc::now();
        let article = Article::from_candidate(
            ArticleId::new(3),
            CandidateArticle {
                title: "T".to_string(),
                ..Default::default()
            },
            now,
        );
        let populated = ArticleWithNotes {
            article,
            notes: vec![Note {
                id: NoteId::new(1),
                body: "hello".to_string(),
                article: ArticleId::new(3),
                created_at: now,
                detached_at: None,
            }],
        };

        let json = serde_json::to_value(&populated).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["saved"], false);
        assert_eq!(json["notes"][0]["body"], "hello");
        assert_eq!(json["notes"][0]["article"], 3);
        assert!(json["notes"][0].get("detached_at").is_none());
    }
}
