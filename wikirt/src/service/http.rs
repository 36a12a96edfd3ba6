//! Blocking HTTP implementation of the service traits
//!
//! - Source text: `GET {api_url}?action=query&prop=revisions&rvslots=main...`
//! - Parse: `POST {parsoid_url}/{domain}/v3/transform/wikitext/to/html/{title}`
//! - Serialize: `POST {parsoid_url}/{domain}/v3/transform/html/to/wikitext/{title}`,
//!   with the original wikitext and HTML attached for selective mode
//!
//! Transport errors, 5xx and 429 responses are retried a bounded number of
//! times with a fixed delay. Anything else fails immediately.

use super::{SerializeMode, SourceFetcher, WikitextService};
use crate::error::ServiceError;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Endpoints and retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Base URL of the transform API
    pub parsoid_url: String,
    /// MediaWiki action API endpoint (`.../api.php`)
    pub api_url: String,
    /// Wiki domain, first path segment of transform requests
    pub domain: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            parsoid_url: "http://localhost:8000".to_string(),
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            domain: "en.wikipedia.org".to_string(),
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

pub struct HttpService {
    client: Client,
    settings: ServiceSettings,
}

impl HttpService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("wikirt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ServiceError::Transport {
                url: settings.parsoid_url.clone(),
                source,
            })?;
        Ok(HttpService { client, settings })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn transform_url(&self, from: &str, to: &str, title: &str) -> Result<Url, ServiceError> {
        transform_url(&self.settings, from, to, title)
    }

    fn post_json(&self, url: &Url, body: &serde_json::Value) -> Result<String, ServiceError> {
        with_retry(&self.settings, url, || {
            let response = self
                .client
                .post(url.clone())
                .json(body)
                .send()
                .map_err(|source| transport(url, source))?;
            read_body(url, response)
        })
    }
}

impl SourceFetcher for HttpService {
    fn fetch_wikitext(&self, title: &str) -> Result<String, ServiceError> {
        let url = Url::parse_with_params(
            &self.settings.api_url,
            &[
                ("action", "query"),
                ("prop", "revisions"),
                ("rvprop", "content"),
                ("rvslots", "main"),
                ("format", "json"),
                ("formatversion", "2"),
                ("titles", title),
            ],
        )
        .map_err(|_| ServiceError::InvalidUrl(self.settings.api_url.clone()))?;

        tracing::debug!(%url, "fetching source");
        let body = with_retry(&self.settings, &url, || {
            let response = self
                .client
                .get(url.clone())
                .send()
                .map_err(|source| transport(&url, source))?;
            read_body(&url, response)
        })?;
        page_content(title, &body)
    }
}

impl WikitextService for HttpService {
    fn parse(&self, title: &str, wikitext: &str) -> Result<String, ServiceError> {
        let url = self.transform_url("wikitext", "html", title)?;
        tracing::debug!(%url, chars = wikitext.len(), "parsing");
        self.post_json(&url, &json!({ "wikitext": wikitext }))
    }

    fn serialize(
        &self,
        title: &str,
        html: &str,
        mode: SerializeMode<'_>,
    ) -> Result<String, ServiceError> {
        let url = self.transform_url("html", "wikitext", title)?;
        let body = match mode {
            SerializeMode::Full => json!({ "html": html }),
            SerializeMode::Selective {
                original_wikitext,
                original_html,
            } => json!({
                "html": html,
                "original": {
                    "wikitext": { "body": original_wikitext },
                    "html": { "body": original_html },
                },
            }),
        };
        tracing::debug!(%url, selective = !matches!(mode, SerializeMode::Full), "serializing");
        self.post_json(&url, &body)
    }
}

fn transform_url(
    settings: &ServiceSettings,
    from: &str,
    to: &str,
    title: &str,
) -> Result<Url, ServiceError> {
    let invalid = || ServiceError::InvalidUrl(settings.parsoid_url.clone());
    let mut url = Url::parse(&settings.parsoid_url).map_err(|_| invalid())?;
    let page = title.replace(' ', "_");
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend([settings.domain.as_str(), "v3", "transform", from, "to", to, page.as_str()]);
    Ok(url)
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// configured number of attempts is used up.
fn with_retry<T>(
    settings: &ServiceSettings,
    url: &Url,
    mut attempt: impl FnMut() -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let max_attempts = settings.max_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempts < max_attempts => {
                tracing::warn!(%url, attempt = attempts, error = %err, "request failed, retrying");
                std::thread::sleep(settings.retry_delay);
            }
            Err(err) if err.is_retryable() => {
                return Err(ServiceError::Exhausted {
                    attempts,
                    last: Box::new(err),
                })
            }
            Err(err) => return Err(err),
        }
    }
}

fn transport(url: &Url, source: reqwest::Error) -> ServiceError {
    ServiceError::Transport {
        url: url.to_string(),
        source,
    }
}

fn read_body(url: &Url, response: Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response.text().map_err(|source| transport(url, source))?;
    if !status.is_success() {
        return Err(ServiceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    content: String,
}

/// Extract the main-slot content of the first page of an action API reply.
fn page_content(title: &str, body: &str) -> Result<String, ServiceError> {
    let missing = |reason: String| ServiceError::MissingContent {
        title: title.to_string(),
        reason,
    };

    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| missing(format!("unreadable response: {e}")))?;
    let page = response
        .query
        .and_then(|query| query.pages.into_iter().next())
        .ok_or_else(|| missing("no pages in response".to_string()))?;
    if page.missing {
        return Err(missing("page does not exist".to_string()));
    }
    page.revisions
        .into_iter()
        .next()
        .map(|revision| revision.slots.main.content)
        .ok_or_else(|| missing("page has no revisions".to_string()))
}
