// Configuration validation rules.
// Checks loaded values before any component is constructed.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - either refresh threshold is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or any endpoint URL is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.personal_refresh_secs == 0 {
            return Err(ConfigError::invalid(
                "personal_refresh_secs",
                "must be greater than 0",
            ));
        }
        if self.totals_refresh_secs == 0 {
            return Err(ConfigError::invalid(
                "totals_refresh_secs",
                "must be greater than 0",
            ));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid(
                "timeout_ms",
                "must not exceed 5 minutes (300000ms)",
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("user_agent", "must not be empty"));
        }

        for (field, value) in [
            ("practice_url", &self.practice_url),
            ("problem_list_url", &self.problem_list_url),
            ("card_api_base", &self.card_api_base),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }

        if !self.practice_url.contains("{user_id}") {
            tracing::warn!(
                practice_url = %self.practice_url,
                "practice_url has no {{user_id}} placeholder; user_id is ignored"
            );
        }

        Ok(())
    }
}
