//! Error taxonomy for the onionify pipeline.
//!
//! Every step returns [`OnionifyError`]; errors are logged with context at the
//! point of detection and propagated with `?` up to the top-level command
//! handler, which prints the message and ends the run. Nothing is retried
//! except the scrape-status poll.

use thiserror::Error;

/// Errors surfaced by the scrape, extraction, and rewrite steps.
#[derive(Debug, Error)]
pub enum OnionifyError {
    /// A required credential was absent at startup. Fatal before any
    /// network call is attempted.
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    /// The scrape service reported the job as failed; the service-provided
    /// error is surfaced verbatim.
    #[error("scrape job failed: {0}")]
    ScrapeJobFailed(String),

    /// The polling budget was exhausted without the job reaching a
    /// terminal state.
    #[error("scrape job did not finish after {attempts} status checks")]
    ScrapeTimeout { attempts: usize },

    /// The job completed but the result payload carried no markdown.
    #[error("scrape job completed with an unexpected empty result")]
    ScrapeEmptyResult,

    /// The model output did not match the required article shape. Carries
    /// the raw output so the failure is diagnosable from the message alone.
    #[error("model output did not match the article schema ({detail}); raw output: {raw}")]
    SchemaValidation { raw: String, detail: String },

    /// Fixed user-facing message for any other extraction or rewrite
    /// failure; the underlying cause is logged, not shown.
    #[error("failed to onionify article")]
    StepFailed,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A service answered with something we could not interpret (non-2xx
    /// status, missing fields).
    #[error("unexpected response from {service}: {detail}")]
    UnexpectedResponse {
        service: &'static str,
        detail: String,
    },
}
