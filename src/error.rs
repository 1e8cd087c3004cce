//! Error taxonomy shared by the scrape pipeline, the stores and the CLI.
//!
//! Extraction never fails on missing fields: absent headlines become empty
//! titles and absent summaries or images are simply omitted. The only
//! rejected input is a blank note body.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// Transport failure or non-success HTTP status while fetching the source page.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// An id-based operation targeted a record that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    /// Caller-supplied data that cannot be stored, such as a blank note body.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configured CSS selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for the CLI's error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::NotFound { .. } => "not_found",
            Self::Database(_) => "database",
            Self::InvalidInput(_) => "invalid_input",
            Self::Selector { .. } => "selector",
            Self::Config(_) | Self::Yaml(_) | Self::Url(_) => "config",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        Self::Fetch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
