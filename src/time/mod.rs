//! Time resolution - maps an IANA timezone identifier to a current-time fact
//!
//! Every outcome, including failures, is a [`TimeLookup`] value. Nothing in
//! here returns `Err` or panics, because the caller is an LLM tool loop that
//! needs something to reason over.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{Config, TimeSource};

pub use local::LocalResolver;
pub use remote::RemoteResolver;

/// strftime pattern for the time part, e.g. `03:45 PM`
pub const TIME_FORMAT: &str = "%I:%M %p";
/// strftime pattern for the date part, e.g. `Monday, December 18, 2023`
pub const DATE_FORMAT: &str = "%A, %B %d, %Y";

/// A successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFact {
    /// The identifier exactly as requested
    pub timezone: String,
    pub current_time: String,
    pub current_date: String,
}

impl TimeFact {
    /// Format a localized instant into a fact for `timezone`
    pub fn from_datetime<Tz>(timezone: impl Into<String>, local: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            timezone: timezone.into(),
            current_time: local.format(TIME_FORMAT).to_string(),
            current_date: local.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Why a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeErrorKind {
    /// The identifier is not a known timezone
    UnknownTimezone,
    /// The time source could not be reached or timed out
    TimeSourceUnavailable,
    /// The remote time service answered with a non-success status
    BadStatus,
    /// The remote time service answered 200 with an unusable body
    InvalidResponse,
}

/// A failed lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeError {
    /// The identifier exactly as requested, possibly malformed
    pub timezone: String,
    pub kind: TimeErrorKind,
    pub message: String,
    /// Status code for [`TimeErrorKind::BadStatus`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl TimeError {
    pub fn unknown_timezone(timezone: &str) -> Self {
        Self {
            timezone: timezone.to_string(),
            kind: TimeErrorKind::UnknownTimezone,
            message: format!(
                "Unknown timezone '{}'. Use a full IANA identifier such as Asia/Dubai.",
                timezone
            ),
            http_status: None,
        }
    }

    pub fn unavailable(timezone: &str, detail: impl fmt::Display) -> Self {
        Self {
            timezone: timezone.to_string(),
            kind: TimeErrorKind::TimeSourceUnavailable,
            message: format!("Time service unavailable for '{}': {}", timezone, detail),
            http_status: None,
        }
    }

    pub fn bad_status(timezone: &str, status: u16) -> Self {
        Self {
            timezone: timezone.to_string(),
            kind: TimeErrorKind::BadStatus,
            message: format!("Time service returned HTTP {} for '{}'", status, timezone),
            http_status: Some(status),
        }
    }

    pub fn invalid_response(timezone: &str, detail: impl fmt::Display) -> Self {
        Self {
            timezone: timezone.to_string(),
            kind: TimeErrorKind::InvalidResponse,
            message: format!(
                "Time service returned an unreadable response for '{}': {}",
                timezone, detail
            ),
            http_status: None,
        }
    }
}

/// Outcome of [`TimeResolver::resolve`]
///
/// Serialized flat with a `status` tag of `success` or `error`, which is the
/// shape the model and the debug lookup both see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TimeLookup {
    Success(TimeFact),
    #[serde(rename = "error")]
    Failure(TimeError),
}

impl TimeLookup {
    pub fn is_success(&self) -> bool {
        matches!(self, TimeLookup::Success(_))
    }

    /// The identifier this outcome refers to
    pub fn timezone(&self) -> &str {
        match self {
            TimeLookup::Success(fact) => &fact.timezone,
            TimeLookup::Failure(err) => &err.timezone,
        }
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        match self {
            TimeLookup::Success(fact) => format!(
                "{} in {} on {}",
                fact.current_time, fact.timezone, fact.current_date
            ),
            TimeLookup::Failure(err) => err.message.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Plain structs of strings cannot fail to serialize
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"status": "error"}))
    }
}

/// Deterministic timezone lookup
#[async_trait]
pub trait TimeResolver: Send + Sync {
    /// Resolve the current time in `timezone`. Never fails; failures are values.
    async fn resolve(&self, timezone: &str) -> TimeLookup;

    /// Short label for status output
    fn name(&self) -> &str;
}

/// Build the resolver selected by configuration
pub fn resolver_from_config(config: &Config) -> Arc<dyn TimeResolver> {
    match config.time.source {
        TimeSource::Local => Arc::new(LocalResolver::new()),
        TimeSource::Remote => Arc::new(RemoteResolver::new(
            &config.time.remote_url,
            Duration::from_secs(config.time.timeout_secs),
        )),
    }
}
