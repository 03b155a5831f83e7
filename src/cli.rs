//! Command-line interface definitions for onionify.

use clap::Parser;
use url::Url;

/// Rewrite a news article as satire.
///
/// Takes a single positional argument, the article URL. Credentials and
/// endpoint overrides come from the environment, not from flags.
///
/// # Examples
///
/// ```sh
/// onionify https://example.com/news/some-story
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// URL of the news article to onionify
    pub url: Url,
}
