use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use scrape_news::cli::Cli;
use scrape_news::commands::{dispatch, exit_code};
use scrape_news::outputs::json;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init (stderr; stdout carries JSON) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let code = match dispatch(&args).await {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Command failed");
            println!("{}", json::render_error(&e, args.pretty));
            ExitCode::from(exit_code(&e))
        }
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    code
}
