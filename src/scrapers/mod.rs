//! Index page scraping.
//!
//! Scraping is split into two phases:
//!
//! 1. **Fetching** ([`fetcher`]): download the configured index page
//! 2. **Extracting** ([`extractor`]): turn the markup into ordered
//!    [`CandidateArticle`](crate::models::CandidateArticle)s
//!
//! Neither phase touches storage. Candidates are handed to the
//! [`Reconciler`](crate::reconcile::Reconciler), which decides what gets committed.

pub mod extractor;
pub mod fetcher;

pub use extractor::Extractor;
pub use fetcher::Fetcher;
