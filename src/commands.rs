//! Command dispatch for the CLI.
//!
//! Every subcommand resolves to a JSON body on success. Failures are left to
//! the caller, which prints [`crate::outputs::json::render_error`] and exits
//! with [`exit_code`].

use tracing::{instrument, warn};

use crate::audit::audit;
use crate::cli::{Cli, Command, ListArgs, NoteCommand};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ArticleFilter, ArticleId, NoteId};
use crate::outputs::json;
use crate::pipeline::Pipeline;
use crate::reconcile::ReconcileReport;
use crate::relations::Relations;
use crate::store::{SqliteStore, Store};

/// Process exit code for a failed command: 2 for an unknown id, 1 otherwise.
pub fn exit_code(err: &AppError) -> u8 {
    match err {
        AppError::NotFound { .. } => 2,
        _ => 1,
    }
}

/// Load the YAML configuration and apply command-line overrides.
pub fn load_config(args: &Cli) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(database) = &args.database {
        config.database = database.clone();
    }
    if let Some(source_url) = &args.source_url {
        config.source_url = source_url.clone();
        config.source()?;
    }
    Ok(config)
}

/// Run one scrape of the configured source into `store`.
///
/// A failed fetch is not an error here: it is logged and reported as a pass
/// that committed nothing.
pub async fn scrape<S: Store>(config: &Config, store: &S) -> Result<ReconcileReport> {
    let pipeline = Pipeline::from_config(config, store)?;
    match pipeline.run().await {
        Ok(report) => Ok(report),
        Err(AppError::Fetch(reason)) => {
            warn!(%reason, "Scrape produced no articles");
            Ok(ReconcileReport::default())
        }
        Err(e) => Err(e),
    }
}

/// Execute the parsed command and return the JSON body to print.
///
/// # Arguments
///
/// * `args` - Parsed command line, including global overrides
///
/// # Returns
///
/// The rendered JSON on success, or the error that [`exit_code`] maps.
#[instrument(level = "info", skip_all)]
pub async fn dispatch(args: &Cli) -> Result<String> {
    let config = load_config(args)?;
    let store = SqliteStore::open(&config.database).await?;
    let relations = Relations::new(&store);
    let pretty = args.pretty;

    match &args.command {
        Command::Scrape => json::render(&scrape(&config, &store).await?, pretty),
        Command::List(ListArgs { saved, all }) => {
            let filter = match (*saved, *all) {
                (true, _) => ArticleFilter::Saved,
                (_, true) => ArticleFilter::All,
                _ => ArticleFilter::Unsaved,
            };
            json::render(&relations.list(filter).await?, pretty)
        }
        Command::Show { id } => {
            json::render(&relations.article_with_notes(ArticleId::new(*id)).await?, pretty)
        }
        Command::Save { id } => {
            json::render(&relations.save_article(ArticleId::new(*id)).await?, pretty)
        }
        Command::Unsave { id } => {
            json::render(&relations.unsave_article(ArticleId::new(*id)).await?, pretty)
        }
        Command::Note(NoteCommand::Add { article_id, body }) => {
            let note = relations
                .add_note(ArticleId::new(*article_id), body.clone())
                .await?;
            json::render(&note, pretty)
        }
        Command::Note(NoteCommand::Show { note_id }) => {
            json::render(&relations.note(NoteId::new(*note_id)).await?, pretty)
        }
        Command::Note(NoteCommand::Delete { note_id, article_id }) => {
            let note = relations
                .delete_note(NoteId::new(*note_id), ArticleId::new(*article_id))
                .await?;
            json::render(&note, pretty)
        }
        Command::Audit { prune } => json::render(&audit(&store, *prune).await?, pretty),
        Command::Export { dir } => {
            let articles = relations.all_with_notes().await?;
            let path = json::write_snapshot(&articles, dir).await?;
            json::render(
                &serde_json::json!({ "path": path, "articles": articles.len() }),
                pretty,
            )
        }
    }
}
