//! Structural extraction of candidate articles from the index page.
//!
//! Each element matching the container selector yields exactly one
//! [`CandidateArticle`], in document order:
//!
//! | Field | Lookup | When absent |
//! |-------|--------|-------------|
//! | `title` | text of `headline` inside the container, trimmed | empty string |
//! | `summary` | text of `summary` inside the container, trimmed | omitted |
//! | `link` | `href` of the first `link` inside the container | omitted |
//! | `img` | `src` of the first `image` in a `media` figure under the container's parent, else in a `thumbnail` inside the container | omitted |
//!
//! Candidates are not filtered here. A container without a headline still
//! produces a candidate with an empty title; deduplication is the
//! reconciler's job.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::config::SelectorConfig;
use crate::error::{AppError, Result};
use crate::models::CandidateArticle;

/// Compiled selectors for turning an index page into candidates.
///
/// Built once from a [`SelectorConfig`] and reused for every page.
pub struct Extractor {
    container: Selector,
    headline: Selector,
    summary: Selector,
    link: Selector,
    media: Selector,
    image: Selector,
    thumbnail: Selector,
    base: Option<Url>,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Selector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

impl Extractor {
    /// Compile every configured selector.
    ///
    /// # Arguments
    ///
    /// * `selectors` - CSS selectors from the configuration
    ///
    /// # Returns
    ///
    /// The extractor, or [`AppError::Selector`] naming the first selector that
    /// does not parse.
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            headline: parse_selector(&selectors.headline)?,
            summary: parse_selector(&selectors.summary)?,
            link: parse_selector(&selectors.link)?,
            media: parse_selector(&selectors.media)?,
            image: parse_selector(&selectors.image)?,
            thumbnail: parse_selector(&selectors.thumbnail)?,
            base: None,
        })
    }

    /// Resolve relative `link` and `img` values against `base`.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Parse `html` and return one candidate per container, in document order.
    #[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
    pub fn extract(&self, html: &str) -> Vec<CandidateArticle> {
        let document = Html::parse_document(html);
        let candidates: Vec<CandidateArticle> = document
            .select(&self.container)
            .map(|container| self.candidate(container))
            .collect();
        debug!(count = candidates.len(), "Extracted candidates");
        candidates
    }

    fn candidate(&self, container: ElementRef<'_>) -> CandidateArticle {
        let title = text_of(container, &self.headline);
        let summary = Some(text_of(container, &self.summary)).filter(|s| !s.is_empty());
        let link = container
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| self.resolve(href));
        let img = self
            .media_image(container)
            .or_else(|| self.thumbnail_image(container))
            .map(|src| self.resolve(src));

        CandidateArticle {
            title,
            summary,
            link,
            img,
        }
    }

    /// First image inside a media figure that shares the container's parent.
    fn media_image<'a>(&self, container: ElementRef<'a>) -> Option<&'a str> {
        let parent = container.parent().and_then(ElementRef::wrap)?;
        let src = parent
            .select(&self.media)
            .flat_map(|figure| figure.select(&self.image))
            .next()?
            .value()
            .attr("src")?;
        Some(src).filter(|s| !s.is_empty())
    }

    fn thumbnail_image<'a>(&self, container: ElementRef<'a>) -> Option<&'a str> {
        let src = container
            .select(&self.thumbnail)
            .flat_map(|thumb| thumb.select(&self.image))
            .next()?
            .value()
            .attr("src")?;
        Some(src).filter(|s| !s.is_empty())
    }

    fn resolve(&self, value: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(value)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| value.to_string()),
            None => value.to_string(),
        }
    }
}

/// Concatenated text of every match of `selector` under `container`, trimmed.
fn text_of(container: ElementRef<'_>, selector: &Selector) -> String {
    container
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}
