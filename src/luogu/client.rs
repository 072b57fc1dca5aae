// Luogu HTTP client.
// Sends browser-like GET requests and converts non-success statuses to errors.

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue},
};

use crate::config::AppConfig;
use crate::error::{BadgeError, Result};

/// Source of raw page text and binary downloads.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a URL and return its body as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// GET a URL and return its body as bytes.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP client for Luogu pages and badge images.
pub struct LuoguClient {
    client: Client,
}

impl LuoguClient {
    /// Create a client using the configured user agent and timeout.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(BadgeError::Http)?;

        Ok(Self { client })
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        check_response(response)
    }
}

#[async_trait]
impl PageFetcher for LuoguClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let text = response.text().await?;
        tracing::debug!(url, bytes = text.len(), "fetched page");
        Ok(text)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await?;
        tracing::debug!(url, bytes = bytes.len(), "fetched binary");
        Ok(bytes.to_vec())
    }
}

/// Check response status and convert errors.
fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BadgeError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}
