//! Retrieval of the raw index page.
//!
//! A fetch is a single unauthenticated GET of the configured source URL.
//! There are no retries; any transport error or non-success status is a
//! terminal [`AppError::Fetch`] for that scrape.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};

/// HTTP client bound to the single source page.
pub struct Fetcher {
    client: Client,
    url: Url,
}

impl Fetcher {
    /// Build a fetcher for `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - The index page to download
    /// * `user_agent` - Value of the `User-Agent` header
    /// * `timeout` - Whole-request timeout; `None` keeps the client default
    ///
    /// # Returns
    ///
    /// The fetcher, or [`AppError::Config`] if the HTTP client cannot be built.
    pub fn new(url: Url, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    /// Build a fetcher from `source_url`, `user_agent` and `timeout_secs`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.source()?,
            &config.user_agent,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download the source page as text.
    #[instrument(level = "info", skip_all, fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<String> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("HTTP {status} from {}", self.url)));
        }

        let html = response.text().await?;
        info!(bytes = html.len(), "Fetched source page");
        debug!(%status, "Fetch complete");
        Ok(html)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    pub(crate) async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Url::parse(&format!("http://{addr}/section/world")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let url = serve_once("200 OK", "<html><body>hi</body></html>").await;
        let fetcher = Fetcher::new(url, "test-agent", Some(Duration::from_secs(5))).unwrap();

        let html = fetcher.fetch().await.unwrap();
        assert_eq!(html, "<html><body>hi</body></html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_fetch_error() {
        let url = serve_once("503 Service Unavailable", "down").await;
        let fetcher = Fetcher::new(url, "test-agent", Some(Duration::from_secs(5))).unwrap();

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_fetch_error() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let fetcher = Fetcher::new(url, "test-agent", Some(Duration::from_secs(5))).unwrap();

        let err = fetcher.fetch().await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_url() {
        let config = Config {
            source_url: "file:///etc/passwd".to_string(),
            ..Config::default()
        };
        assert!(Fetcher::from_config(&config).is_err());
    }
}
