// Luogu payload types.
// Tolerant serde shapes for the lentille-context JSON and the reduced counts.

use serde::Deserialize;

/// Number of difficulty tiers (0 = unrated, 7 = hardest).
pub const TIER_COUNT: usize = 8;

/// One count per difficulty tier.
pub type TierCounts = [u32; TIER_COUNT];

/// Problem types counted towards statistics (main and beginner sets).
pub const COUNTED_TYPES: [&str; 2] = ["P", "B"];

/// Normalize a stored count sequence to exactly one slot per tier.
pub fn to_tiers(counts: &[u32]) -> TierCounts {
    let mut tiers = [0; TIER_COUNT];
    for (slot, count) in tiers.iter_mut().zip(counts) {
        *slot = *count;
    }
    tiers
}

/// Reduced personal statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatSnapshot {
    /// Passed problems per difficulty tier.
    pub passed: TierCounts,
    /// Submitted problems that were never passed.
    pub unpassed: u32,
}

/// A problem reference inside the practice payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemRef {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub difficulty: Option<i64>,
}

impl ProblemRef {
    pub fn is_counted(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| COUNTED_TYPES.contains(&kind))
    }

    /// Tier index if the difficulty is a valid tier.
    pub fn tier(&self) -> Option<usize> {
        self.difficulty
            .and_then(|d| usize::try_from(d).ok())
            .filter(|&d| d < TIER_COUNT)
    }
}

/// Practice page payload (`data` member of lentille-context).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeData {
    #[serde(default)]
    pub passed: Option<Vec<ProblemRef>>,
    #[serde(default)]
    pub submitted: Option<Vec<ProblemRef>>,
}

/// Problem list page payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemListData {
    #[serde(default)]
    pub problems: Option<ProblemPage>,
}

/// Paged problem listing; only the total count is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemPage {
    #[serde(default)]
    pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_tiers_pads_and_truncates() {
        assert_eq!(to_tiers(&[]), [0; TIER_COUNT]);
        assert_eq!(to_tiers(&[1, 2]), [1, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            to_tiers(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            [1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_problem_ref_tier_bounds() {
        let make = |difficulty| ProblemRef {
            kind: Some("P".into()),
            difficulty,
        };
        assert_eq!(make(Some(0)).tier(), Some(0));
        assert_eq!(make(Some(7)).tier(), Some(7));
        assert_eq!(make(Some(8)).tier(), None);
        assert_eq!(make(Some(-1)).tier(), None);
        assert_eq!(make(None).tier(), None);
    }

    #[test]
    fn test_problem_ref_counted_types() {
        let make = |kind: Option<&str>| ProblemRef {
            kind: kind.map(String::from),
            difficulty: Some(1),
        };
        assert!(make(Some("P")).is_counted());
        assert!(make(Some("B")).is_counted());
        assert!(!make(Some("CF")).is_counted());
        assert!(!make(None).is_counted());
    }

    #[test]
    fn test_practice_data_tolerates_missing_fields() {
        let data: PracticeData = serde_json::from_str(r#"{"passed": null}"#).unwrap();
        assert!(data.passed.is_none());
        assert!(data.submitted.is_none());

        let page: ProblemListData = serde_json::from_str(r#"{"problems": {}}"#).unwrap();
        assert_eq!(page.problems.and_then(|p| p.count), None);
    }
}
