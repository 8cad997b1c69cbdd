//! Remote resolver: `GET {base}/api/timezone/{ianaId}`
//!
//! Failures keep their cause: transport errors and timeouts are
//! `time_source_unavailable`, a 404 is `unknown_timezone`, any other non-200
//! is `bad_status` with the code.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use super::{TimeError, TimeFact, TimeLookup, TimeResolver};

/// Body of a successful time service response; other fields are ignored
#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    datetime: String,
}

/// HTTP time service client
#[derive(Clone)]
pub struct RemoteResolver {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
}

impl RemoteResolver {
    /// Create a resolver for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("failed to build time service client: {}", e);
                None
            }
        };

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Endpoint for `timezone`, one path segment per identifier component
    fn url_for(&self, timezone: &str) -> Option<Url> {
        let mut url = Url::parse(&self.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["api", "timezone"])
            .extend(timezone.split('/'));
        Some(url)
    }
}

/// Shape check for an IANA identifier before it goes on the wire.
///
/// Components are non-empty, never `.` or `..`, and use only ASCII
/// letters, digits, `_`, `+` and `-`.
fn is_plausible_identifier(timezone: &str) -> bool {
    !timezone.is_empty()
        && timezone.split('/').all(|part| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
        })
}

#[async_trait]
impl TimeResolver for RemoteResolver {
    async fn resolve(&self, timezone: &str) -> TimeLookup {
        let id = timezone.trim();
        if !is_plausible_identifier(id) {
            tracing::debug!(timezone, "rejected identifier before lookup");
            return TimeLookup::Failure(TimeError::unknown_timezone(timezone));
        }

        let Some(client) = &self.client else {
            return TimeLookup::Failure(TimeError::unavailable(timezone, "HTTP client unavailable"));
        };

        let Some(url) = self.url_for(id) else {
            return TimeLookup::Failure(TimeError::unavailable(
                timezone,
                format!("invalid time service URL '{}'", self.base_url),
            ));
        };
        tracing::debug!(%url, "querying time service");

        let response = match client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return TimeLookup::Failure(TimeError::unavailable(
                    timezone,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
            Err(e) => return TimeLookup::Failure(TimeError::unavailable(timezone, e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return TimeLookup::Failure(TimeError::unknown_timezone(timezone));
        }
        if status != StatusCode::OK {
            tracing::warn!(timezone, status = status.as_u16(), "time service error status");
            return TimeLookup::Failure(TimeError::bad_status(timezone, status.as_u16()));
        }

        let body: TimezoneResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return TimeLookup::Failure(TimeError::unavailable(timezone, e));
            }
            Err(e) => return TimeLookup::Failure(TimeError::invalid_response(timezone, e)),
        };

        match DateTime::parse_from_rfc3339(&body.datetime) {
            Ok(local) => TimeLookup::Success(TimeFact::from_datetime(timezone, &local)),
            Err(e) => TimeLookup::Failure(TimeError::invalid_response(
                timezone,
                format!("bad datetime '{}': {}", body.datetime, e),
            )),
        }
    }

    fn name(&self) -> &str {
        "remote time service"
    }
}
