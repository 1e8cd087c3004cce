//! YAML configuration for the scraper and the store.
//!
//! Every field has a default, so an empty or missing file yields a working
//! configuration that scrapes the world news section into `scrape_news.db`.
//!
//! ```yaml
//! source_url: https://www.nytimes.com/section/world
//! database: scrape_news.db
//! timeout_secs: 30
//! resolve_relative_urls: false
//! selectors:
//!   container: article
//!   headline: h2.headline
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_SOURCE_URL: &str = "https://www.nytimes.com/section/world";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The single index page every scrape targets.
    pub source_url: String,
    /// Path of the SQLite database file.
    pub database: String,
    /// `User-Agent` header sent with the fetch. Defaults to `scrape_news/<version>`.
    pub user_agent: String,
    /// Request timeout. Unset leaves the HTTP client's default in place.
    pub timeout_secs: Option<u64>,
    /// Resolve relative `link` and `img` values against `source_url`.
    pub resolve_relative_urls: bool,
    /// Where each article field is found on the page.
    pub selectors: SelectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            database: "scrape_news.db".to_string(),
            user_agent: concat!("scrape_news/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
            resolve_relative_urls: false,
            selectors: SelectorConfig::default(),
        }
    }
}

/// CSS selectors used by the extractor.
///
/// `media` is looked up under the container's parent (the sibling figure),
/// `thumbnail` under the container itself; `image` is searched inside
/// whichever of the two matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One match per article.
    pub container: String,
    /// Title text inside the container.
    pub headline: String,
    /// Summary text inside the container.
    pub summary: String,
    /// Anchor whose `href` is the article link.
    pub link: String,
    /// Figure under the container's parent holding the main image.
    pub media: String,
    /// Image element whose `src` is taken, inside `media` or `thumbnail`.
    pub image: String,
    /// Fallback image wrapper inside the container.
    pub thumbnail: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "article".to_string(),
            headline: "h2.headline".to_string(),
            summary: "p.summary".to_string(),
            link: "a".to_string(),
            media: "figure.media".to_string(),
            image: "img".to_string(),
            thumbnail: ".wide-thumb".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, or defaults when no path is given.
    #[instrument(level = "debug")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_yaml(&content)?;
                info!(path = %path.display(), "Loaded configuration");
                config
            }
            None => {
                debug!("No configuration file given; using defaults");
                Self::default()
            }
        };
        config.source()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parsed, validated source URL.
    pub fn source(&self) -> Result<Url> {
        let url = Url::parse(&self.source_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AppError::Config(format!(
                "source_url must be http or https, got `{other}`"
            ))),
        }
    }
}
