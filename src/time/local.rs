//! Local resolver: system clock + bundled IANA database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use super::{TimeError, TimeFact, TimeLookup, TimeResolver};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Resolves against the tz database compiled into `chrono-tz`
#[derive(Clone)]
pub struct LocalResolver {
    clock: Clock,
}

impl LocalResolver {
    /// Resolver reading the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Utc::now),
        }
    }

    /// Resolver with a custom clock, for pinning the instant in tests
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Synchronous lookup; the async trait method delegates here
    pub fn lookup(&self, timezone: &str) -> TimeLookup {
        let tz: Tz = match timezone.trim().parse() {
            Ok(tz) => tz,
            Err(e) => {
                tracing::debug!(timezone, error = %e, "timezone not in tz database");
                return TimeLookup::Failure(TimeError::unknown_timezone(timezone));
            }
        };

        let now = (self.clock)().with_timezone(&tz);
        TimeLookup::Success(TimeFact::from_datetime(timezone, &now))
    }
}

impl Default for LocalResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeResolver for LocalResolver {
    async fn resolve(&self, timezone: &str) -> TimeLookup {
        self.lookup(timezone)
    }

    fn name(&self) -> &str {
        "local tz database"
    }
}
