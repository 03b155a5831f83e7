//! Extraction step: raw scraped markdown to a validated [`Article`].
//!
//! The scraped page is embedded in a prompt asking the model to pull out
//! the title, body, and byline, with the response constrained to the
//! article JSON schema. The response is parsed and validated; a
//! non-conforming response fails with a schema-validation error carrying
//! the raw output, while call failures collapse into the fixed
//! "failed to onionify article" message after the cause is logged.

use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use crate::errors::OnionifyError;
use crate::llm::{Complete, CompletionRequest};
use crate::models::Article;
use crate::utils::truncate_for_log;

const SYSTEM_PROMPT: &str = "You are a precise news article parser. \
    You extract structured fields from scraped web pages and output only valid JSON.";

/// JSON schema constraining the model's output to the [`Article`] shape.
pub(crate) fn article_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string", "description": "The article headline" },
            "body": { "type": "string", "description": "The full article text" },
            "author": {
                "type": ["string", "null"],
                "description": "The byline, or null if the page has none"
            }
        },
        "required": ["title", "body", "author"],
        "additionalProperties": false
    })
}

fn extraction_prompt(markdown: &str) -> String {
    format!(
        "Extract the news article from the following scraped page. \
        Return the headline as `title`, the full article text as `body`, \
        and the byline as `author` (null if there is none). \
        Ignore navigation, ads, and boilerplate.\n\n\
        Scraped page:\n\n{markdown}"
    )
}

/// Extract a validated [`Article`] from raw markdown via one LLM call.
#[instrument(level = "info", skip_all, fields(markdown_bytes = markdown.len()))]
pub async fn extract_article<C: Complete>(
    llm: &C,
    markdown: &str,
) -> Result<Article, OnionifyError> {
    let request = CompletionRequest {
        system: SYSTEM_PROMPT,
        prompt: extraction_prompt(markdown),
        response_schema: Some(article_schema()),
    };

    let raw = llm.complete(request).await.map_err(|e| {
        error!(error = %e, "Extraction call failed");
        OnionifyError::StepFailed
    })?;

    let article = parse_article(&raw)?;
    info!(title = %article.title, "Extracted article");
    Ok(article)
}

/// Parse and validate the model's output against the article shape.
fn parse_article(raw: &str) -> Result<Article, OnionifyError> {
    let article: Article = serde_json::from_str(raw).map_err(|e| {
        warn!(
            error = %e,
            response_preview = %truncate_for_log(raw, 300),
            "Model returned non-conforming JSON"
        );
        OnionifyError::SchemaValidation {
            raw: raw.to_string(),
            detail: e.to_string(),
        }
    })?;

    article.validate().map_err(|detail| {
        warn!(%detail, "Model output failed article validation");
        OnionifyError::SchemaValidation {
            raw: raw.to_string(),
            detail,
        }
    })?;

    Ok(article)
}
