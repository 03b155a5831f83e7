//! Rewrite step: a real [`Article`] to its satirical counterpart.
//!
//! One freeform LLM call; the response is split on line breaks, with the
//! first line (minus a leading `Title:` label) taken as the new headline
//! and the remainder as the body. The naive first-line split mirrors the
//! original tool's behavior and is kept for compatibility; it will
//! mis-parse multi-line titles or preambles.

use tracing::{error, info, instrument};

use crate::errors::OnionifyError;
use crate::llm::{Complete, CompletionRequest};
use crate::models::Article;

const SYSTEM_PROMPT: &str = "You are a satirical news writer in the style of \
    a well-known parody newspaper. You rewrite real articles as satire while \
    preserving their underlying subject.";

const TITLE_LABEL: &str = "Title:";

fn rewrite_prompt(article: &Article) -> String {
    format!(
        "Rewrite the following news article as satire. Invent an absurd, \
        humorous headline and rewrite the body with humorous commentary, \
        but preserve the intent of the original story. Put the headline on \
        the first line, prefixed with `Title:`, and the rewritten body on \
        the lines after it.\n\n\
        Title: {title}\n\
        Author: {author}\n\n\
        {body}",
        title = article.title,
        author = article.author_or_unknown(),
        body = article.body,
    )
}

/// Rewrite an article in a satirical register via one LLM call.
///
/// The returned article replaces the original; its author is a fixed label
/// crediting the original byline, or `Unknown` when the original had none.
#[instrument(level = "info", skip_all, fields(title = %article.title))]
pub async fn rewrite_article<C: Complete>(
    llm: &C,
    article: Article,
) -> Result<Article, OnionifyError> {
    let request = CompletionRequest {
        system: SYSTEM_PROMPT,
        prompt: rewrite_prompt(&article),
        response_schema: None,
    };

    let raw = llm.complete(request).await.map_err(|e| {
        error!(error = %e, "Rewrite call failed");
        OnionifyError::StepFailed
    })?;

    let rewritten = parse_rewrite(&raw, article.author.as_deref());
    info!(title = %rewritten.title, "Rewrote article");
    Ok(rewritten)
}

/// Split a freeform rewrite response into a new article.
///
/// First line (with any leading `Title:` stripped) becomes the title; the
/// remaining lines, rejoined and trimmed, become the body.
fn parse_rewrite(raw: &str, original_author: Option<&str>) -> Article {
    let mut lines = raw.lines();
    let first = lines.next().unwrap_or_default();
    let title = first
        .trim()
        .strip_prefix(TITLE_LABEL)
        .unwrap_or(first)
        .trim()
        .to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

    Article {
        title,
        body,
        author: Some(format!(
            "Parodied version of {}",
            original_author.unwrap_or("Unknown")
        )),
    }
}
