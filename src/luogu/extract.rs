// Extraction of the lentille-context JSON payload embedded in Luogu pages.
// Reads the `data` member (or the whole object) into tolerant serde shapes.

use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{BadgeError, Result};

use super::types::{PracticeData, ProblemListData, StatSnapshot};

const PAYLOAD_SELECTOR: &str = r#"script#lentille-context[type="application/json"]"#;

/// Raw JSON text of the embedded payload, if present and non-empty.
pub fn payload_text(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(PAYLOAD_SELECTOR).map_err(|e| BadgeError::Other(e.to_string()))?;

    let text = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    Ok(text)
}

/// Parse the payload and return its data root.
fn payload_root(html: &str, source: &str) -> Result<Value> {
    let text = payload_text(html)?.ok_or_else(|| BadgeError::PayloadNotFound(source.into()))?;
    let mut value: Value = serde_json::from_str(&text)?;

    if let Some(data) = value.get_mut("data") {
        return Ok(data.take());
    }
    Ok(value)
}

/// Reduce a practice page to per-tier passed counts and the unpassed total.
pub fn parse_practice(html: &str, source: &str) -> Result<StatSnapshot> {
    let data: PracticeData = serde_json::from_value(payload_root(html, source)?)?;
    // Hidden or logged-out profiles omit the list entirely.
    if data.passed.is_none() {
        return Err(BadgeError::MissingField {
            url: source.into(),
            field: "passed",
        });
    }
    Ok(reduce_practice(&data))
}

/// Count passed problems per tier and unpassed submissions.
pub fn reduce_practice(data: &PracticeData) -> StatSnapshot {
    let mut snapshot = StatSnapshot::default();

    for problem in data.passed.iter().flatten() {
        if !problem.is_counted() {
            continue;
        }
        if let Some(tier) = problem.tier() {
            snapshot.passed[tier] += 1;
        }
    }

    snapshot.unpassed = data
        .submitted
        .iter()
        .flatten()
        .filter(|problem| problem.is_counted())
        .count() as u32;

    snapshot
}

/// Total problem count reported by a problem list page.
pub fn parse_problem_count(html: &str, source: &str) -> Result<u32> {
    let data: ProblemListData = serde_json::from_value(payload_root(html, source)?)?;
    let count = data.problems.and_then(|page| page.count).unwrap_or(0);
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
