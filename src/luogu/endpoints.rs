// Luogu page endpoints.
// Typed fetches for the practice page and the per-tier problem lists.

use crate::config::AppConfig;
use crate::error::Result;

use super::client::PageFetcher;
use super::extract::{parse_practice, parse_problem_count};
use super::types::{StatSnapshot, TIER_COUNT, TierCounts};

/// Outcome of fetching every tier's problem count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTotals {
    /// Fetched counts, with failed tiers holding their previous value.
    pub counts: TierCounts,
    /// Tiers whose fetch or extraction failed.
    pub failed: Vec<usize>,
}

impl TierTotals {
    /// Every tier was fetched.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// No tier produced a usable count.
    pub fn is_empty(&self) -> bool {
        self.failed.len() == TIER_COUNT || self.counts.iter().all(|&c| c == 0)
    }
}

/// Fetch and reduce the configured user's practice page.
pub async fn fetch_practice<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &AppConfig,
) -> Result<StatSnapshot> {
    let url = config.practice_page_url();
    let html = fetcher.fetch_text(&url).await?;
    parse_practice(&html, &url)
}

/// Fetch the problem count of a single difficulty tier.
pub async fn fetch_tier_total<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &AppConfig,
    tier: usize,
) -> Result<u32> {
    let url = config.problem_list_page_url(tier);
    let html = fetcher.fetch_text(&url).await?;
    parse_problem_count(&html, &url)
}

/// Fetch every tier's problem count, one request at a time.
///
/// A tier that fails keeps its count from `previous`.
pub async fn fetch_tier_totals<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &AppConfig,
    previous: &TierCounts,
) -> TierTotals {
    let mut counts = *previous;
    let mut failed = Vec::new();

    for (tier, slot) in counts.iter_mut().enumerate() {
        tracing::info!(tier, "fetching tier total");
        match fetch_tier_total(fetcher, config, tier).await {
            Ok(count) => *slot = count,
            Err(e) => {
                tracing::warn!(tier, error = %e, "tier total unavailable, keeping cached count");
                failed.push(tier);
            }
        }
    }

    TierTotals { counts, failed }
}
