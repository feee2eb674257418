//! University matching: keyword/filter search and preference scoring.
//!
//! Both engines are pure functions over borrowed catalog slices. They never mutate the
//! universities or preferences they are given, and neither can fail: empty or missing criteria
//! simply stop constraining (filters) or stop contributing (scores).

mod filter;
mod page;
mod scoring;
mod sort;

pub use filter::{filter_and_sort, FilterState, TuitionWindow};
pub use page::Page;
pub use scoring::{
    score_and_rank, score_university, BudgetWeights, CriterionWeight, MatchCriterion,
    RankOptions, ScoreComponent, ScoredUniversity, ScoringWeights,
};
pub use sort::SortKey;
