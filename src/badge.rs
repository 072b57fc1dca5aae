// Badge URL construction.
// Practice cards use plain query parameters; progress uses a shields.io badge.

use crate::config::CardParams;
use crate::luogu::TierCounts;

const SHIELDS_BASE: &str = "https://img.shields.io/badge";
const PROGRESS_STYLE: &str = "for-the-badge";

/// Percentage at which the progress badge turns green.
const PROGRESS_GREEN_AT: f64 = 5.0;

/// Ordered `key=value` query builder.
///
/// Values are written verbatim; the card service expects raw commas in
/// count sequences.
#[derive(Debug, Clone, Default)]
pub struct QueryUrl {
    base: String,
    params: Vec<(String, String)>,
}

impl QueryUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Append the fixed card parameters.
    pub fn card(self, card: &CardParams) -> Self {
        self.param("id", card.id)
            .param("custom", card.custom)
            .param("name", &card.name)
            .param("color", &card.color)
            .param("ccfLevel", card.ccf_level)
            .param("tag", &card.tag)
    }

    pub fn build(&self) -> String {
        if self.params.is_empty() {
            return self.base.clone();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.base, query)
    }
}

/// Comma-join a count sequence.
pub fn join_counts(counts: &[u32]) -> String {
    counts
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Card showing the user's passed counts per tier.
pub fn personal_card_url(
    api_base: &str,
    card: &CardParams,
    passed: &TierCounts,
    unpassed: u32,
) -> String {
    QueryUrl::new(api_base)
        .card(card)
        .param("passed", join_counts(passed))
        .param("unpassed", unpassed)
        .build()
}

/// Card showing the site-wide problem count per tier.
pub fn domination_card_url(api_base: &str, card: &CardParams, totals: &TierCounts) -> String {
    QueryUrl::new(api_base)
        .card(card)
        .param("unpassed", 0)
        .param("passed", join_counts(totals))
        .build()
}

/// shields.io badge for the weighted progress percentage.
pub fn progress_badge_url(label: &str, percentage: f64) -> String {
    let message = format!("{percentage:.10}%25");
    let color = if percentage >= PROGRESS_GREEN_AT {
        "brightgreen"
    } else {
        "red"
    };
    format!(
        "{SHIELDS_BASE}/{}-{}-{color}?style={PROGRESS_STYLE}",
        escape_shields(label),
        message
    )
}

/// Escape a static badge path segment: dashes and underscores are doubled,
/// spaces become underscores.
fn escape_shields(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '-' => out.push_str("--"),
            '_' => out.push_str("__"),
            ' ' => out.push('_'),
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    out
}
