//! Data model for news articles.
//!
//! A single domain entity flows through the pipeline: [`Article`]. The
//! extraction step creates one from scraped markdown, the rewrite step
//! replaces it with a satirical version, and the result is printed and
//! discarded. There is no identity beyond the in-memory value and no
//! persistence.

use serde::{Deserialize, Serialize};

/// A structured news article, real or satirical.
///
/// Field names match the JSON schema sent to the LLM for structured
/// extraction, so the model's output deserializes directly into this type.
///
/// # Invariants
///
/// `title` and `body` are required and non-empty at the schema level;
/// `author` may be absent. [`Article::validate`] enforces the non-empty
/// checks that serde alone cannot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    pub title: String,
    /// The full article text.
    pub body: String,
    /// The byline, when the source carried one.
    #[serde(default)]
    pub author: Option<String>,
}

impl Article {
    /// Check the non-empty invariants on `title` and `body`.
    ///
    /// Returns a human-readable description of the first violation found,
    /// suitable for embedding in a schema-validation error.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("field `title` is empty".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("field `body` is empty".to_string());
        }
        Ok(())
    }

    /// The byline to credit, falling back to `"Unknown"` when absent.
    pub fn author_or_unknown(&self) -> &str {
        self.author.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserializes_with_author() {
        let article: Article =
            serde_json::from_str(r#"{"title":"T","body":"B","author":"A"}"#).unwrap();
        assert_eq!(article.title, "T");
        assert_eq!(article.body, "B");
        assert_eq!(article.author.as_deref(), Some("A"));
    }

    #[test]
    fn test_article_deserializes_without_author() {
        let article: Article = serde_json::from_str(r#"{"title":"T","body":"B"}"#).unwrap();
        assert_eq!(article.author, None);
    }

    #[test]
    fn test_article_deserializes_with_null_author() {
        let article: Article =
            serde_json::from_str(r#"{"title":"T","body":"B","author":null}"#).unwrap();
        assert_eq!(article.author, None);
    }

    #[test]
    fn test_missing_title_is_a_deserialization_error() {
        let result = serde_json::from_str::<Article>(r#"{"body":"B"}"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("title"));
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let article = Article {
            title: "  ".to_string(),
            body: "B".to_string(),
            author: None,
        };
        assert_eq!(article.validate(), Err("field `title` is empty".to_string()));
    }

    #[test]
    fn test_validate_rejects_empty_body() {
        let article = Article {
            title: "T".to_string(),
            body: String::new(),
            author: None,
        };
        assert_eq!(article.validate(), Err("field `body` is empty".to_string()));
    }

    #[test]
    fn test_validate_accepts_complete_article() {
        let article = Article {
            title: "T".to_string(),
            body: "B".to_string(),
            author: Some("A".to_string()),
        };
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_author_or_unknown() {
        let with_author = Article {
            title: "T".to_string(),
            body: "B".to_string(),
            author: Some("Jane Doe".to_string()),
        };
        let without_author = Article {
            title: "T".to_string(),
            body: "B".to_string(),
            author: None,
        };
        assert_eq!(with_author.author_or_unknown(), "Jane Doe");
        assert_eq!(without_author.author_or_unknown(), "Unknown");
    }
}
