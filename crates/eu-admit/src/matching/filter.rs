use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::sort::SortKey;
use crate::catalog::{normalize_term, Catalog, University};

/// Tuition slider bounds in EUR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionWindow {
    pub min: u32,
    pub max: u32,
}

impl TuitionWindow {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn unbounded() -> Self {
        Self::new(0, u32::MAX)
    }

    /// Inverted bounds are swapped so the overlap test is independent of which side the caller
    /// dragged past the other.
    pub fn normalized(self) -> Self {
        if self.min > self.max {
            Self::new(self.max, self.min)
        } else {
            self
        }
    }
}

impl Default for TuitionWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Search filter selections. Empty sets place no constraint on their criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub countries: BTreeSet<String>,
    pub fields: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub tuition: TuitionWindow,
    pub sort: SortKey,
}

impl FilterState {
    /// Defaults derived from the catalog: nothing selected and the full tuition span.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let bounds = catalog.tuition_bounds();
        Self {
            tuition: TuitionWindow::new(bounds.min, bounds.max),
            ..Self::default()
        }
    }

    pub fn matches(&self, university: &University) -> bool {
        let country_ok = self.countries.is_empty() || self.countries.contains(&university.country);
        let field_ok = self.fields.is_empty() || university.offers_any_field(&self.fields);
        let language_ok =
            self.languages.is_empty() || university.teaches_in_any(&self.languages);
        let window = self.tuition.normalized();
        let tuition_ok = university.tuition.overlaps(window.min, window.max);

        country_ok && field_ok && language_ok && tuition_ok
    }
}

fn matches_term(university: &University, term: Option<&str>) -> bool {
    let Some(term) = term else {
        return true;
    };

    university.name.to_lowercase().contains(term)
        || university
            .programs
            .iter()
            .any(|program| program.name.to_lowercase().contains(term))
}

/// Select and order the universities matching `term` and `filters`.
///
/// The sort is stable, so universities that compare equal keep their catalog order.
pub fn filter_and_sort<'a>(
    universities: &'a [University],
    term: &str,
    filters: &FilterState,
) -> Vec<&'a University> {
    let term = normalize_term(term);

    let mut matched: Vec<&University> = universities
        .iter()
        .filter(|university| matches_term(university, term.as_deref()))
        .filter(|university| filters.matches(university))
        .collect();

    matched.sort_by(|a, b| filters.sort.compare(a, b));

    tracing::debug!(
        term = term.as_deref().unwrap_or(""),
        sort = filters.sort.label(),
        matched = matched.len(),
        total = universities.len(),
        "filtered universities"
    );

    matched
}
