// Time-based refresh gating for cached categories.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Independently refreshed data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Personal,
    Totals,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Personal => write!(f, "personal stats"),
            Category::Totals => write!(f, "tier totals"),
        }
    }
}

/// Refetch a category only once its cached value is older than `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    threshold: Duration,
    force: bool,
}

impl RefreshPolicy {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            force: false,
        }
    }

    /// Treat every check as due, regardless of age.
    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Whether a value last refreshed at `last` should be refetched at `now`.
    ///
    /// Both are epoch seconds. A timestamp in the future is never due.
    pub fn is_due(&self, last: f64, now: f64) -> bool {
        if self.force || !last.is_finite() {
            return true;
        }
        now - last > self.threshold.as_secs_f64()
    }
}

/// A point in time as fractional epoch seconds, the cache's timestamp unit.
pub fn epoch_secs(at: &DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
