// Luogu scraping module.
// Fetches practice and problem list pages and reduces their embedded payloads.

pub mod client;
pub mod endpoints;
pub mod extract;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use client::{LuoguClient, PageFetcher};
pub use types::*;
