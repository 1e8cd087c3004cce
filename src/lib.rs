//! # scrape_news
//!
//! Scrapes a news index page into a deduplicated article store, and lets
//! users save articles and annotate them with notes.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`scrapers::Fetcher`]): GET the configured index page
//! 2. **Extracting** ([`scrapers::Extractor`]): turn containers into candidates
//! 3. **Reconciling** ([`reconcile::Reconciler`]): commit each unseen title once
//! 4. **Relations** ([`relations::Relations`]): save/unsave articles, add and
//!    delete notes, read articles with notes populated
//!
//! Every component is handed its [`store::Store`] explicitly; there is no
//! global connection.

pub mod audit;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod reconcile;
pub mod relations;
pub mod scrapers;
pub mod store;
pub mod utils;

pub use error::{AppError, Result};
