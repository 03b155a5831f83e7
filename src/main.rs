//! # onionify
//!
//! Fetch a news article from a URL, extract its structured fields with an
//! LLM, rewrite it in a satirical register with a second LLM call, and
//! print the result to the terminal.
//!
//! ## Usage
//!
//! ```sh
//! onionify https://example.com/news/some-story
//! ```
//!
//! ## Pipeline
//!
//! Three steps in strict sequence, a single [`Article`] threaded through:
//! 1. **Scrape**: submit the URL to the scrape service, poll to completion
//! 2. **Extract**: structured LLM call producing a validated article
//! 3. **Rewrite**: freeform LLM call producing the satirical version
//!
//! ## Environment
//!
//! - `OPENAI_API_KEY` (required), `OPENAI_API_URL`, `OPENAI_MODEL`
//! - `SCRAPER_API_KEY` (required), `SCRAPER_API_URL`

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod errors;
mod extract;
mod llm;
mod models;
mod render;
mod rewrite;
mod scrape;
mod utils;

use cli::Cli;
use errors::OnionifyError;
use llm::{Complete, OpenAiClient};
use models::Article;
use scrape::{ScrapeBackend, ScrapeClient};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    // Default to warn so log output does not fight the spinners.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("{} {e}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

#[instrument(skip_all)]
async fn run(args: Cli) -> Result<(), OnionifyError> {
    // Both credentials are checked before any network call is attempted.
    let llm_key = require_env("OPENAI_API_KEY")?;
    let scrape_key = require_env("SCRAPER_API_KEY")?;
    info!(url = %args.url, "onionify starting up");

    let scraper = ScrapeClient::new(scrape_key);
    let llm = OpenAiClient::new(llm_key);

    let (original_title, onionified) = onionify(&scraper, &llm, args.url.as_str()).await?;
    render::print_result(&original_title, &onionified);
    Ok(())
}

/// Run the scrape, extract, and rewrite steps in sequence.
///
/// Returns the original headline alongside the onionified article so the
/// caller can print both. Generic over the service backends so the
/// composition is testable without a network.
async fn onionify<B: ScrapeBackend, C: Complete>(
    scraper: &B,
    llm: &C,
    url: &str,
) -> Result<(String, Article), OnionifyError> {
    let markdown = with_spinner(
        "Scraping article...",
        "Scraped article",
        scrape::scrape_markdown(scraper, url),
    )
    .await?;

    let article = with_spinner(
        "Extracting article...",
        "Extracted article",
        extract::extract_article(llm, &markdown),
    )
    .await?;
    let original_title = article.title.clone();

    let onionified = with_spinner(
        "Onionifying article...",
        "Onionified article",
        rewrite::rewrite_article(llm, article),
    )
    .await?;

    Ok((original_title, onionified))
}

/// Wrap one pipeline step in a terminal spinner.
///
/// Progress display is observational only; the step result passes through
/// untouched.
async fn with_spinner<T, F>(
    message: &'static str,
    done: &'static str,
    step: F,
) -> Result<T, OnionifyError>
where
    F: Future<Output = Result<T, OnionifyError>>,
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}").expect("valid spinner template"),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    match step.await {
        Ok(value) => {
            spinner.finish_with_message(done);
            Ok(value)
        }
        Err(e) => {
            spinner.abandon_with_message(format!("{message} failed"));
            Err(e)
        }
    }
}

/// Read a required credential, treating blank values as absent.
fn require_env(name: &'static str) -> Result<String, OnionifyError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(OnionifyError::MissingCredential(name)),
    }
}
