//! The scrape pipeline: fetch, extract, reconcile.
//!
//! Runs on the same pipeline are serialized, so two overlapping scrapes
//! never interleave their candidates. A failed fetch aborts the run before
//! anything is committed.

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::scrapers::{Extractor, Fetcher};
use crate::store::Store;

/// One configured source wired to a store.
///
/// Holds a lock for the duration of [`Pipeline::run`] and
/// [`Pipeline::ingest_html`].
pub struct Pipeline<'a, S> {
    fetcher: Fetcher,
    extractor: Extractor,
    store: &'a S,
    running: Mutex<()>,
}

impl<'a, S: Store> Pipeline<'a, S> {
    pub fn new(fetcher: Fetcher, extractor: Extractor, store: &'a S) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            running: Mutex::new(()),
        }
    }

    /// Build the fetcher and extractor from `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Source URL, HTTP options and selectors
    /// * `store` - Where committed articles go
    ///
    /// # Returns
    ///
    /// The pipeline, or the first configuration error: an invalid source
    /// URL, an unbuildable HTTP client, or a selector that does not parse.
    pub fn from_config(config: &Config, store: &'a S) -> Result<Self> {
        let fetcher = Fetcher::from_config(config)?;
        let mut extractor = Extractor::new(&config.selectors)?;
        if config.resolve_relative_urls {
            extractor = extractor.with_base(fetcher.url().clone());
        }
        Ok(Self::new(fetcher, extractor, store))
    }

    /// Fetch the source page and commit its new articles.
    #[instrument(level = "info", skip_all, fields(url = %self.fetcher.url()))]
    pub async fn run(&self) -> Result<ReconcileReport> {
        let _guard = self.running.lock().await;
        let html = match self.fetcher.fetch().await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Scrape aborted; nothing committed");
                return Err(e);
            }
        };
        let report = self.reconcile_html(&html).await;
        info!(committed = report.committed, "Scrape finished");
        Ok(report)
    }

    /// Extract and reconcile already-fetched markup.
    pub async fn ingest_html(&self, html: &str) -> ReconcileReport {
        let _guard = self.running.lock().await;
        self.reconcile_html(html).await
    }

    async fn reconcile_html(&self, html: &str) -> ReconcileReport {
        let candidates = self.extractor.extract(html);
        Reconciler::new(self.store).reconcile(candidates).await
    }
}
