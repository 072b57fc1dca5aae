// In-memory page fetcher for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{BadgeError, Result};

use super::client::PageFetcher;

/// Serves canned responses and records every requested URL.
/// Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    binaries: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    pub fn with_binary(mut self, url: &str, bytes: &[u8]) -> Self {
        self.binaries.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }

    fn not_found(url: &str) -> BadgeError {
        BadgeError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.record(url);
        self.pages.get(url).cloned().ok_or_else(|| Self::not_found(url))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.record(url);
        self.binaries
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}

/// Minimal Luogu page carrying `payload` as its lentille-context.
pub fn lentille_page(payload: &str) -> String {
    format!(
        r#"<html><head><script id="lentille-context" type="application/json">{payload}</script></head><body></body></html>"#
    )
}
