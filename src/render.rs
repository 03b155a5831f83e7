//! Terminal rendering of the finished article.
//!
//! Output formatting is observational only; nothing in the pipeline
//! contract depends on it.

use console::style;

use crate::models::Article;

/// Print the original headline followed by the onionified article.
pub fn print_result(original_title: &str, onionified: &Article) {
    println!();
    println!("{} {}", style("Original:").dim(), original_title);
    println!();
    println!("{}", style(&onionified.title).bold().yellow());
    if let Some(author) = &onionified.author {
        println!("{}", style(format!("By {author}")).italic().dim());
    }
    println!();
    println!("{}", onionified.body);
    println!();
}
