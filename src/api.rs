//! Campus Life Events API access with exponential backoff retry logic.
//!
//! The engine reads events and organizers from the remote event store and
//! hands finished documents to its preview mail endpoint. All three
//! collaborators sit behind traits so the bundle assembler and the sinks can
//! be exercised against in-memory fakes.
//!
//! # Architecture
//!
//! - [`EventSource`] / [`OrganizerSource`]: the two reads of bundle assembly
//! - [`PreviewMailer`]: remote preview-send of a rendered document
//! - [`ApiClient`]: HTTP implementation of all three, authenticated with the
//!   `session_id` cookie
//! - [`RetryFetch`]: decorator that adds retry logic to any source
//!
//! # Retry Strategy
//!
//! - Configurable number of retries (3 by default)
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay
//! - Authentication failures are never retried
//!
//! Preview sends are not retried: a send is not idempotent.

use crate::error::{NewsletterError, Result};
use crate::models::{Event, Organizer};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const EVENTS_PATH: &str = "api/v1/events";
const ORGANIZERS_PATH: &str = "api/v1/organizers";
const PREVIEW_PATH: &str = "api/v1/events/newsletter/preview";
const SESSION_COOKIE: &str = "session_id";

/// Read access to the event store.
pub trait EventSource {
    /// List events starting in `[start, end)`.
    ///
    /// Implementations may over-fetch; the assembler filters by window and
    /// publication flag itself.
    async fn list_events_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>>;
}

/// Read access to the organizer store.
pub trait OrganizerSource {
    async fn list_organizers(&self) -> Result<Vec<Organizer>>;
}

/// Remote mail-sending collaborator used for preview sends.
pub trait PreviewMailer {
    /// Send `html` as a preview mail with the given subject.
    async fn send_preview(&self, subject: &str, html: &str) -> Result<()>;
}

/// HTTP client for the Campus Life Events API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The session cookie lives in the client's default headers.
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[derive(Serialize)]
struct PreviewRequest<'a> {
    subject: &'a str,
    html_body: &'a str,
}

impl ApiClient {
    /// Build a client for `base_url`, authenticating with `session_token`.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::Config`] when the base URL is not an
    /// absolute http(s) URL or the token cannot be sent as a header value.
    pub fn new(base_url: &str, session_token: Option<&str>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.trim())
            .map_err(|e| NewsletterError::Config(format!("invalid API base URL `{base_url}`: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(NewsletterError::Config(format!(
                "API base URL must use http or https, got `{}`",
                base_url.scheme()
            )));
        }
        // `Url::join` replaces the last path segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = session_token.map(str::trim).filter(|t| !t.is_empty()) {
            let mut cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))
                .map_err(|e| NewsletterError::Config(format!("invalid session token: {e}")))?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NewsletterError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| NewsletterError::Config(format!("invalid endpoint {path}: {e}")))
    }

    #[instrument(level = "info", skip_all, fields(resource = %resource))]
    async fn get_json<T: DeserializeOwned>(&self, resource: &str, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let t0 = Instant::now();
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| NewsletterError::fetch(resource, e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| NewsletterError::fetch(resource, e.to_string()))?;
        let dt = t0.elapsed();

        check_status(resource, status, &body)?;
        debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = dt.as_millis() as u64,
            "GET ok"
        );

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate_for_log(&body, 400), "Response did not parse");
            NewsletterError::fetch_rejected(resource, format!("malformed response: {e}"))
        })
    }
}

/// Map a non-success status onto the matching error.
fn check_status(resource: &str, status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(NewsletterError::Unauthorized(format!(
            "{resource} request rejected with {status}"
        )));
    }
    let message = format!("HTTP {status}: {}", truncate_for_log(body.trim(), 200));
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(NewsletterError::fetch(resource, message))
    } else {
        Err(NewsletterError::fetch_rejected(resource, message))
    }
}

impl EventSource for ApiClient {
    #[instrument(level = "info", skip_all, fields(start = %start, end = %end))]
    async fn list_events_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        // The events endpoint has no date filter.
        let events: Vec<Event> = self.get_json("events", EVENTS_PATH).await?;
        let total = events.len();
        let in_window: Vec<Event> = events
            .into_iter()
            .filter(|e| e.start_date_time >= start && e.start_date_time < end)
            .collect();
        info!(total, in_window = in_window.len(), "Fetched events");
        Ok(in_window)
    }
}

impl OrganizerSource for ApiClient {
    #[instrument(level = "info", skip_all)]
    async fn list_organizers(&self) -> Result<Vec<Organizer>> {
        let organizers: Vec<Organizer> = self.get_json("organizers", ORGANIZERS_PATH).await?;
        info!(count = organizers.len(), "Fetched organizers");
        Ok(organizers)
    }
}

impl PreviewMailer for ApiClient {
    #[instrument(level = "info", skip_all, fields(subject = %subject, html_bytes = html.len()))]
    async fn send_preview(&self, subject: &str, html: &str) -> Result<()> {
        let url = self.endpoint(PREVIEW_PATH)?;
        let resp = self
            .http
            .post(url)
            .json(&PreviewRequest {
                subject,
                html_body: html,
            })
            .send()
            .await
            .map_err(|e| NewsletterError::Preview(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Preview sent");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NewsletterError::Unauthorized(format!(
                "preview request rejected with {status}"
            )));
        }
        Err(NewsletterError::Preview(format!(
            "HTTP {status}: {}",
            truncate_for_log(body.trim(), 200)
        )))
    }
}

/// Wrapper that adds exponential backoff retry logic to an event or
/// organizer source.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T> {
    /// Wrap `inner`, retrying each failed read up to `max_retries` times.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }

    async fn retrying<R, F, Fut>(&self, what: &'static str, mut op: F) -> Result<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    error!(what, error = %e, "Fetch failed permanently; not retrying");
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            what,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "Fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        what,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "Fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: EventSource> EventSource for RetryFetch<T> {
    async fn list_events_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        self.retrying("events", || self.inner.list_events_for_window(start, end))
            .await
    }
}

impl<T: OrganizerSource> OrganizerSource for RetryFetch<T> {
    async fn list_organizers(&self) -> Result<Vec<Organizer>> {
        self.retrying("organizers", || self.inner.list_organizers()).await
    }
}

impl<T: PreviewMailer> PreviewMailer for RetryFetch<T> {
    async fn send_preview(&self, subject: &str, html: &str) -> Result<()> {
        self.inner.send_preview(subject, html).await
    }
}

/// In-memory stores for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    #[derive(Debug, Default, Clone)]
    pub struct InMemoryStore {
        pub events: Vec<Event>,
        pub organizers: Vec<Organizer>,
    }

    impl EventSource for InMemoryStore {
        async fn list_events_for_window(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Event>> {
            Ok(self
                .events
                .iter()
                .filter(|e| e.start_date_time >= start && e.start_date_time < end)
                .cloned()
                .collect())
        }
    }

    impl OrganizerSource for InMemoryStore {
        async fn list_organizers(&self) -> Result<Vec<Organizer>> {
            Ok(self.organizers.clone())
        }
    }
}
