//! JSON rendering of records, reports and errors.

use chrono::Local;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::models::ArticleWithNotes;
use crate::utils::ensure_writable_dir;

/// Serialize `value`, pretty-printed when asked.
pub fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// The body printed for a failed command: a stable `error` code plus the message.
pub fn render_error(err: &AppError, pretty: bool) -> String {
    let body = json!({ "error": err.kind(), "message": err.to_string() });
    if pretty {
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
    } else {
        body.to_string()
    }
}

/// Write every article, notes populated, to `{dir}/articles-{date}.json`.
///
/// A second export on the same day replaces the earlier file.
#[instrument(level = "info", skip_all, fields(dir = %dir, count = articles.len()))]
pub async fn write_snapshot(articles: &[ArticleWithNotes], dir: &str) -> Result<PathBuf> {
    ensure_writable_dir(dir).await?;
    let json = render(articles, true)?;

    let path = PathBuf::from(dir).join(format!(
        "articles-{}.json",
        Local::now().date_naive().format("%Y-%m-%d")
    ));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote article snapshot");
    Ok(path)
}
