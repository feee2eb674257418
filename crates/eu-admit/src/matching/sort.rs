use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::University;

/// Result orderings offered by the search page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "ranking-asc")]
    RankingAsc,
    #[serde(rename = "ranking-desc")]
    RankingDesc,
    #[serde(rename = "tuition-asc")]
    TuitionAsc,
    #[serde(rename = "tuition-desc")]
    TuitionDesc,
    #[serde(rename = "deadline-asc")]
    DeadlineAsc,
}

impl SortKey {
    pub const fn label(self) -> &'static str {
        match self {
            SortKey::RankingAsc => "ranking-asc",
            SortKey::RankingDesc => "ranking-desc",
            SortKey::TuitionAsc => "tuition-asc",
            SortKey::TuitionDesc => "tuition-desc",
            SortKey::DeadlineAsc => "deadline-asc",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ranking-asc" => Some(SortKey::RankingAsc),
            "ranking-desc" => Some(SortKey::RankingDesc),
            "tuition-asc" => Some(SortKey::TuitionAsc),
            "tuition-desc" => Some(SortKey::TuitionDesc),
            "deadline-asc" => Some(SortKey::DeadlineAsc),
            _ => None,
        }
    }

    pub(crate) fn compare(self, a: &University, b: &University) -> Ordering {
        match self {
            SortKey::RankingAsc => by_ranking(a, b),
            SortKey::RankingDesc => by_ranking_desc(a, b),
            SortKey::TuitionAsc => a.tuition.min.cmp(&b.tuition.min),
            SortKey::TuitionDesc => b.tuition.max.cmp(&a.tuition.max),
            SortKey::DeadlineAsc => by_deadline(a, b),
        }
    }
}

/// Ranked before unranked, then lower ranking number first.
pub(crate) fn by_ranking(a: &University, b: &University) -> Ordering {
    match (a.ranking, b.ranking) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Unranked entries stay last in both directions.
fn by_ranking_desc(a: &University, b: &University) -> Ordering {
    match (a.ranking, b.ranking) {
        (Some(left), Some(right)) => right.cmp(&left),
        _ => by_ranking(a, b),
    }
}

fn by_deadline(a: &University, b: &University) -> Ordering {
    match (a.earliest_deadline(), b.earliest_deadline()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
