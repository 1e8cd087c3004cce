//! Command-line interface definitions.
//!
//! Global options can also come from environment variables; anything not
//! given falls back to the YAML configuration, then to built-in defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Scrape a news index page into a local store, then save and annotate articles.
///
/// # Examples
///
/// ```sh
/// scrape_news scrape
/// scrape_news list --saved
/// scrape_news note add 12 "follow up on this"
/// scrape_news note delete 3 12
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(long, env = "SCRAPE_NEWS_DATABASE", global = true)]
    pub database: Option<String>,

    /// Index page to scrape (overrides the config file)
    #[arg(long, env = "SCRAPE_NEWS_SOURCE_URL", global = true)]
    pub source_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fetch the source page and store articles with unseen titles
    Scrape,

    /// List articles (unsaved by default)
    List(ListArgs),

    /// Show one article with its notes
    Show { id: i64 },

    /// Mark an article as saved
    Save { id: i64 },

    /// Unsave an article and detach its notes
    Unsave { id: i64 },

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Check for duplicate titles and detached notes
    Audit {
        /// Delete detached notes
        #[arg(long)]
        prune: bool,
    },

    /// Write every article with its notes to a dated JSON file
    Export {
        #[arg(short, long)]
        dir: String,
    },
}

#[derive(Args, Debug, PartialEq, Eq)]
#[group(multiple = false)]
pub struct ListArgs {
    /// Only saved articles, newest first
    #[arg(long)]
    pub saved: bool,

    /// Every article
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum NoteCommand {
    /// Attach a note to an article
    Add { article_id: i64, body: String },

    /// Show one note
    Show { note_id: i64 },

    /// Delete a note from an article
    Delete { note_id: i64, article_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_with_globals() {
        let cli = Cli::parse_from([
            "scrape_news",
            "--database",
            "/tmp/news.db",
            "scrape",
            "--pretty",
        ]);

        assert_eq!(cli.database.as_deref(), Some("/tmp/news.db"));
        assert!(cli.pretty);
        assert_eq!(cli.command, Command::Scrape);
    }

    #[test]
    fn test_list_defaults_to_unsaved() {
        let cli = Cli::parse_from(["scrape_news", "list"]);
        assert_eq!(
            cli.command,
            Command::List(ListArgs {
                saved: false,
                all: false
            })
        );
    }

    #[test]
    fn test_list_flags_conflict() {
        assert!(Cli::try_parse_from(["scrape_news", "list", "--saved", "--all"]).is_err());
    }

    #[test]
    fn test_note_delete_argument_order() {
        let cli = Cli::parse_from(["scrape_news", "note", "delete", "3", "12"]);
        assert_eq!(
            cli.command,
            Command::Note(NoteCommand::Delete {
                note_id: 3,
                article_id: 12
            })
        );
    }

    #[test]
    fn test_note_add() {
        let cli = Cli::parse_from(["scrape_news", "note", "add", "7", "read later"]);
        assert_eq!(
            cli.command,
            Command::Note(NoteCommand::Add {
                article_id: 7,
                body: "read later".to_string()
            })
        );
    }

    #[test]
    fn test_audit_prune_flag() {
        let cli = Cli::parse_from(["scrape_news", "audit", "--prune"]);
        assert_eq!(cli.command, Command::Audit { prune: true });
    }
}
