//! Scrape service interaction: job submission and status polling.
//!
//! The scrape service converts a URL into markdown asynchronously: a
//! submission call returns an opaque job id, and the job is then polled
//! until it reaches a terminal state.
//!
//! # Polling budget
//!
//! Status is checked at a fixed 1-second interval for at most 5 attempts
//! (~5 seconds worst case). A job still pending after the budget is
//! exhausted fails with [`OnionifyError::ScrapeTimeout`]. This is the only
//! retry loop in the program.
//!
//! The HTTP backend is fixed to scrape with proxying and captcha solving
//! disabled; neither is user-configurable.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::errors::OnionifyError;

const DEFAULT_API_URL: &str = "https://api.scraperapi.dev";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_STATUS_CHECKS: usize = 5;

/// Status of an in-flight scrape job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A snapshot of a scrape job as reported by one status poll.
#[derive(Debug, Deserialize)]
pub struct ScrapeJob {
    pub status: JobStatus,
    /// Result payload, present once the job completes.
    #[serde(default)]
    pub markdown: Option<String>,
    /// Service-provided error, present when the job failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// Trait over the scrape service, so the poll loop can be exercised
/// against scripted statuses.
pub trait ScrapeBackend {
    /// Submit a URL for scraping and return the opaque job id.
    async fn submit(&self, url: &str) -> Result<String, OnionifyError>;

    /// Fetch the current state of a submitted job.
    async fn poll(&self, job_id: &str) -> Result<ScrapeJob, OnionifyError>;
}

/// HTTP client for the scrape service.
#[derive(Debug)]
pub struct ScrapeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions {
    use_proxy: bool,
    solve_captchas: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

impl ScrapeClient {
    /// Create a client from a credential, reading the optional endpoint
    /// override from the environment.
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: env::var("SCRAPER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        }
    }
}

impl ScrapeBackend for ScrapeClient {
    #[instrument(level = "info", skip(self))]
    async fn submit(&self, url: &str) -> Result<String, OnionifyError> {
        let body = json!({
            "url": url,
            "format": "markdown",
            "options": ScrapeOptions { use_proxy: false, solve_captchas: false },
        });

        let response = self
            .http
            .post(format!("{}/v1/jobs", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "Scrape submission rejected");
            return Err(OnionifyError::UnexpectedResponse {
                service: "scrape service",
                detail: format!("{status}: {text}"),
            });
        }

        let submitted: SubmitResponse = response.json().await?;
        info!(job_id = %submitted.id, "Scrape job submitted");
        Ok(submitted.id)
    }

    #[instrument(level = "debug", skip(self))]
    async fn poll(&self, job_id: &str) -> Result<ScrapeJob, OnionifyError> {
        let response = self
            .http
            .get(format!("{}/v1/jobs/{job_id}", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OnionifyError::UnexpectedResponse {
                service: "scrape service",
                detail: format!("{status}: {text}"),
            });
        }

        Ok(response.json().await?)
    }
}

/// Scrape a URL to markdown, polling the job to completion.
///
/// Submits the URL, then checks status up to [`MAX_STATUS_CHECKS`] times at
/// [`POLL_INTERVAL`]. Terminal states short-circuit the loop: a failed job
/// surfaces the service error immediately, and a completed job yields its
/// markdown or fails with an empty-result error when the payload is blank.
#[instrument(level = "info", skip(backend))]
pub async fn scrape_markdown<B: ScrapeBackend>(
    backend: &B,
    url: &str,
) -> Result<String, OnionifyError> {
    let job_id = backend.submit(url).await?;

    for attempt in 1..=MAX_STATUS_CHECKS {
        let job = backend.poll(&job_id).await?;
        debug!(attempt, status = ?job.status, "Polled scrape job");

        match job.status {
            JobStatus::Completed => {
                let markdown = job
                    .markdown
                    .filter(|m| !m.is_empty())
                    .ok_or(OnionifyError::ScrapeEmptyResult)?;
                info!(attempt, bytes = markdown.len(), "Scrape job completed");
                return Ok(markdown);
            }
            JobStatus::Failed => {
                let message = job
                    .error
                    .unwrap_or_else(|| "no error detail provided".to_string());
                warn!(attempt, error = %message, "Scrape job failed");
                return Err(OnionifyError::ScrapeJobFailed(message));
            }
            JobStatus::Pending | JobStatus::Running => sleep(POLL_INTERVAL).await,
        }
    }

    warn!(attempts = MAX_STATUS_CHECKS, "Scrape job never reached a terminal state");
    Err(OnionifyError::ScrapeTimeout {
        attempts: MAX_STATUS_CHECKS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays a fixed sequence of poll responses.
    struct ScriptedBackend {
        polls: Mutex<VecDeque<ScrapeJob>>,
        poll_count: Mutex<usize>,
        submitted: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(polls: Vec<ScrapeJob>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                poll_count: Mutex::new(0),
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn poll_count(&self) -> usize {
            *self.poll_count.lock().unwrap()
        }
    }

    impl ScrapeBackend for ScriptedBackend {
        async fn submit(&self, url: &str) -> Result<String, OnionifyError> {
            self.submitted.lock().unwrap().push(url.to_string());
            Ok("job-1".to_string())
        }

        async fn poll(&self, job_id: &str) -> Result<ScrapeJob, OnionifyError> {
            assert_eq!(job_id, "job-1");
            *self.poll_count.lock().unwrap() += 1;
            Ok(self
                .polls
                .lock()
                .unwrap()
                .pop_front()
                .expect("polled more often than scripted"))
        }
    }

    fn job(status: JobStatus) -> ScrapeJob {
        ScrapeJob {
            status,
            markdown: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_completed_job_returns_markdown() {
        let backend = ScriptedBackend::new(vec![ScrapeJob {
            status: JobStatus::Completed,
            markdown: Some("# Headline".to_string()),
            error: None,
        }]);

        let markdown = scrape_markdown(&backend, "https://example.com/story")
            .await
            .unwrap();
        assert_eq!(markdown, "# Headline");
        assert_eq!(backend.poll_count(), 1);
        assert_eq!(
            backend.submitted.lock().unwrap().as_slice(),
            ["https://example.com/story"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_surfaces_error_without_sleeping() {
        let backend = ScriptedBackend::new(vec![ScrapeJob {
            status: JobStatus::Failed,
            markdown: None,
            error: Some("blocked by origin".to_string()),
        }]);

        let t0 = tokio::time::Instant::now();
        let err = scrape_markdown(&backend, "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, OnionifyError::ScrapeJobFailed(ref m) if m == "blocked by origin"));
        assert_eq!(backend.poll_count(), 1);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_forever_times_out_after_five_checks() {
        let backend = ScriptedBackend::new(vec![
            job(JobStatus::Pending),
            job(JobStatus::Pending),
            job(JobStatus::Pending),
            job(JobStatus::Pending),
            job(JobStatus::Pending),
        ]);

        let t0 = tokio::time::Instant::now();
        let err = scrape_markdown(&backend, "https://example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, OnionifyError::ScrapeTimeout { attempts: 5 }));
        assert_eq!(backend.poll_count(), 5);
        // 5 checks separated by the 1-second interval.
        assert_eq!(t0.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_completing_after_pending_polls() {
        let backend = ScriptedBackend::new(vec![
            job(JobStatus::Pending),
            job(JobStatus::Running),
            ScrapeJob {
                status: JobStatus::Completed,
                markdown: Some("content".to_string()),
                error: None,
            },
        ]);

        let markdown = scrape_markdown(&backend, "https://example.com")
            .await
            .unwrap();
        assert_eq!(markdown, "content");
        assert_eq!(backend.poll_count(), 3);
    }

    #[tokio::test]
    async fn test_completed_job_with_no_markdown_is_empty_result() {
        let backend = ScriptedBackend::new(vec![job(JobStatus::Completed)]);

        let err = scrape_markdown(&backend, "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, OnionifyError::ScrapeEmptyResult));
    }

    #[tokio::test]
    async fn test_completed_job_with_blank_markdown_is_empty_result() {
        let backend = ScriptedBackend::new(vec![ScrapeJob {
            status: JobStatus::Completed,
            markdown: Some(String::new()),
            error: None,
        }]);

        let err = scrape_markdown(&backend, "https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, OnionifyError::ScrapeEmptyResult));
    }

    #[test]
    fn test_job_status_deserializes_lowercase() {
        let job: ScrapeJob =
            serde_json::from_str(r#"{"status":"running"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.markdown, None);
        assert_eq!(job.error, None);
    }

    #[test]
    fn test_completed_job_deserializes_with_markdown() {
        let job: ScrapeJob =
            serde_json::from_str(r##"{"status":"completed","markdown":"# Hi"}"##).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.markdown.as_deref(), Some("# Hi"));
    }
}
