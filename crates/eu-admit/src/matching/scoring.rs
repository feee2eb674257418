use serde::{Deserialize, Serialize};

use super::sort::by_ranking;
use crate::catalog::{University, UniversityId};
use crate::profile::Preferences;

/// Universities without a ranking are scored as if ranked at the horizon.
const RANKING_HORIZON: u32 = 200;

/// How a set-valued criterion converts matches into points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionWeight {
    /// Flat points when at least one preferred value is offered.
    AnyMatch(f64),
    /// Points for every offered value that is also preferred.
    PerMatch(f64),
}

impl CriterionWeight {
    fn points(self, matches: usize) -> f64 {
        match self {
            CriterionWeight::AnyMatch(points) if matches > 0 => points,
            CriterionWeight::AnyMatch(_) => 0.0,
            CriterionWeight::PerMatch(points) => points * matches as f64,
        }
    }
}

/// Budget scoring, applied only when both budget bounds are present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetWeights {
    /// Points when tuition overlaps the budget, plus a bonus when the top of the range fits.
    Overlap { overlap: f64, affordable_bonus: f64 },
    /// Points only when the whole tuition range sits inside the budget.
    Contained(f64),
}

/// Weighting for a single scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub country: f64,
    pub field: CriterionWeight,
    pub language: CriterionWeight,
    pub budget: BudgetWeights,
    /// Linear ranking bonus `max(0, horizon - ranking) / horizon`; `None` disables it.
    pub ranking_horizon: Option<u32>,
}

impl ScoringWeights {
    /// Onboarding wizard weighting.
    pub const fn wizard() -> Self {
        Self {
            country: 3.0,
            field: CriterionWeight::AnyMatch(2.0),
            language: CriterionWeight::AnyMatch(2.0),
            budget: BudgetWeights::Overlap {
                overlap: 1.5,
                affordable_bonus: 0.5,
            },
            ranking_horizon: Some(RANKING_HORIZON),
        }
    }

    /// Search-page recommendation strip weighting.
    pub const fn strip() -> Self {
        Self {
            country: 2.0,
            field: CriterionWeight::PerMatch(1.5),
            language: CriterionWeight::PerMatch(1.0),
            budget: BudgetWeights::Contained(1.0),
            ranking_horizon: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCriterion {
    Country,
    Field,
    Language,
    Budget,
    Affordability,
    Ranking,
}

/// One scored contribution, kept so callers can explain a fit score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub criterion: MatchCriterion,
    pub points: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredUniversity<'a> {
    pub university: &'a University,
    pub score: f64,
    pub components: Vec<ScoreComponent>,
}

impl<'a> ScoredUniversity<'a> {
    fn unscored(university: &'a University) -> Self {
        Self {
            university,
            score: 0.0,
            components: Vec::new(),
        }
    }
}

/// Ranking controls for [`score_and_rank`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub weights: ScoringWeights,
    pub limit: usize,
    /// Ignore preferences and return the best-ranked universities with a zero score.
    pub cold_start: bool,
    /// Appended with a zero score when they fall outside the top `limit`.
    pub pinned: Vec<UniversityId>,
}

impl RankOptions {
    pub fn wizard(shortlist: &[UniversityId]) -> Self {
        Self {
            weights: ScoringWeights::wizard(),
            limit: 12,
            cold_start: false,
            pinned: shortlist.to_vec(),
        }
    }

    pub fn strip(completed_onboarding: bool) -> Self {
        Self {
            weights: ScoringWeights::strip(),
            limit: 6,
            cold_start: !completed_onboarding,
            pinned: Vec::new(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Score a single university against `preferences`. Every contribution is non-negative.
pub fn score_university<'a>(
    university: &'a University,
    preferences: &Preferences,
    weights: &ScoringWeights,
) -> ScoredUniversity<'a> {
    let mut components = Vec::new();

    if preferences.countries.contains(&university.country) && weights.country > 0.0 {
        components.push(ScoreComponent {
            criterion: MatchCriterion::Country,
            points: weights.country,
            notes: format!("{} is a preferred country", university.country),
        });
    }

    let field_matches = university
        .fields
        .iter()
        .filter(|field| preferences.fields.contains(*field))
        .count();
    let field_points = weights.field.points(field_matches);
    if field_points > 0.0 {
        components.push(ScoreComponent {
            criterion: MatchCriterion::Field,
            points: field_points,
            notes: format!("{field_matches} preferred field(s) offered"),
        });
    }

    let language_matches = university
        .languages
        .iter()
        .filter(|language| preferences.languages.contains(*language))
        .count();
    let language_points = weights.language.points(language_matches);
    if language_points > 0.0 {
        components.push(ScoreComponent {
            criterion: MatchCriterion::Language,
            points: language_points,
            notes: format!("{language_matches} preferred language(s) taught"),
        });
    }

    if let Some((budget_min, budget_max)) = preferences.budget() {
        let tuition = university.tuition;
        match weights.budget {
            BudgetWeights::Overlap {
                overlap,
                affordable_bonus,
            } => {
                if tuition.overlaps(budget_min, budget_max) {
                    components.push(ScoreComponent {
                        criterion: MatchCriterion::Budget,
                        points: overlap,
                        notes: format!(
                            "tuition {}-{} overlaps budget {}-{}",
                            tuition.min, tuition.max, budget_min, budget_max
                        ),
                    });
                    if tuition.max <= budget_max {
                        components.push(ScoreComponent {
                            criterion: MatchCriterion::Affordability,
                            points: affordable_bonus,
                            notes: format!(
                                "maximum tuition {} within budget {}",
                                tuition.max, budget_max
                            ),
                        });
                    }
                }
            }
            BudgetWeights::Contained(points) => {
                if tuition.contained_in(budget_min, budget_max) {
                    components.push(ScoreComponent {
                        criterion: MatchCriterion::Budget,
                        points,
                        notes: format!(
                            "tuition {}-{} inside budget {}-{}",
                            tuition.min, tuition.max, budget_min, budget_max
                        ),
                    });
                }
            }
        }
    }

    if let Some(horizon) = weights.ranking_horizon.filter(|horizon| *horizon > 0) {
        let ranking = university.ranking.unwrap_or(horizon);
        let bonus = f64::from(horizon.saturating_sub(ranking)) / f64::from(horizon);
        if bonus > 0.0 {
            components.push(ScoreComponent {
                criterion: MatchCriterion::Ranking,
                points: bonus,
                notes: format!("ranking #{ranking} within top {horizon}"),
            });
        }
    }

    let score = components.iter().map(|component| component.points).sum();

    ScoredUniversity {
        university,
        score,
        components,
    }
}

/// Rank `universities` by fit against `preferences`.
///
/// Results are ordered by score descending, ties broken by ranking ascending, truncated to
/// `options.limit`, then followed by any pinned universities that did not make the cut.
pub fn score_and_rank<'a>(
    universities: &'a [University],
    preferences: &Preferences,
    options: &RankOptions,
) -> Vec<ScoredUniversity<'a>> {
    let mut ranked: Vec<ScoredUniversity<'a>> = if options.cold_start {
        let mut ordered: Vec<&University> = universities.iter().collect();
        ordered.sort_by(|a, b| by_ranking(a, b));
        ordered
            .into_iter()
            .map(ScoredUniversity::unscored)
            .collect()
    } else {
        let mut scored: Vec<ScoredUniversity<'a>> = universities
            .iter()
            .map(|university| score_university(university, preferences, &options.weights))
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| by_ranking(a.university, b.university))
        });
        scored
    };
    ranked.truncate(options.limit);

    for id in &options.pinned {
        if ranked.iter().any(|entry| &entry.university.id == id) {
            continue;
        }
        if let Some(university) = universities.iter().find(|university| &university.id == id) {
            ranked.push(ScoredUniversity::unscored(university));
        }
    }

    tracing::debug!(
        cold_start = options.cold_start,
        limit = options.limit,
        returned = ranked.len(),
        "ranked universities"
    );

    ranked
}
