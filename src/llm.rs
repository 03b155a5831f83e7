//! Language-model API interaction.
//!
//! This module provides the interface for communicating with an
//! OpenAI-compatible chat-completions API.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`Complete`]: Core trait defining async LLM interaction
//! - [`OpenAiClient`]: HTTP implementation over the chat-completions endpoint
//!
//! The trait boundary lets the extraction and rewrite steps be exercised
//! against scripted responses without a network.
//!
//! # Sampling
//!
//! Every call uses a fixed temperature of 0.7 and a fixed output cap of
//! 2000 tokens. Calls are not retried; the only retry loop in the program
//! is the scrape-status poll.

use serde::Deserialize;
use serde_json::{Value, json};
use std::env;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::errors::OnionifyError;

/// Fixed sampling temperature for every completion call.
pub const TEMPERATURE: f64 = 0.7;
/// Fixed cap on completion length, in tokens.
pub const MAX_COMPLETION_TOKENS: u32 = 2000;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A single completion request.
///
/// When `response_schema` is set, the call asks the service to constrain
/// its output to that JSON schema; otherwise the response is freeform text.
#[derive(Debug)]
pub struct CompletionRequest<'a> {
    /// System instruction framing the conversation.
    pub system: &'a str,
    /// User message carrying the actual task.
    pub prompt: String,
    /// Optional JSON schema constraining the output shape.
    pub response_schema: Option<Value>,
}

/// Trait for async LLM interaction.
///
/// Implementors send a [`CompletionRequest`] to a language model and return
/// the response content as text.
pub trait Complete {
    /// Send a completion request and return the model's text response.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, OnionifyError>;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
///
/// The endpoint and model default to OpenAI's but can be pointed at any
/// compatible service via `OPENAI_API_URL` and `OPENAI_MODEL`.
#[derive(Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client from a credential, reading the optional endpoint and
    /// model overrides from the environment.
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl Complete for OpenAiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, OnionifyError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_COMPLETION_TOKENS,
        });
        if let Some(schema) = request.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": "article",
                    "strict": true,
                    "schema": schema,
                },
            });
        }

        let t0 = Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u128, "LLM API returned an error status");
            return Err(OnionifyError::UnexpectedResponse {
                service: "language model",
                detail: format!("{status}: {text}"),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u128, "Completion call finished");

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(OnionifyError::UnexpectedResponse {
                service: "language model",
                detail: "response carried no message content".to_string(),
            })
    }
}
