// Error types for luogu-badges.
// Covers HTTP fetches, payload extraction, cache and document IO.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("embedded lentille-context payload not found in {0}")]
    PayloadNotFound(String),

    #[error("payload from {url} has no `{field}` member")]
    MissingField { url: String, field: &'static str },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BadgeError>;
