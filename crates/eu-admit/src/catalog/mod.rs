//! University catalog: the immutable records searched and scored by the matching engines.
//!
//! Raw seed data is normalized once at the loading boundary (see [`loader`] and [`import`]) so the
//! engines only ever see the canonical shape: a non-empty list of instruction languages, a
//! validated tuition range, and parsed deadline dates.

mod import;
mod loader;
mod normalizer;

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) use normalizer::normalize_term;

const BUILTIN_CATALOG: &str = include_str!("../../data/universities.json");

/// Identifier wrapper for catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniversityId(pub String);

impl UniversityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UniversityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Annual tuition band in EUR. `min <= max` is enforced when records are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionRange {
    pub min: u32,
    pub max: u32,
}

impl TuitionRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// True when the two closed intervals share at least one value.
    pub fn overlaps(&self, min: u32, max: u32) -> bool {
        self.min <= max && self.max >= min
    }

    pub fn contained_in(&self, min: u32, max: u32) -> bool {
        self.min >= min && self.max <= max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub label: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub degree: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCriterion {
    pub label: String,
    pub value: String,
}

/// A university as seen by search, scoring, and application tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: UniversityId,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Lower is better. Absent for unranked institutions.
    pub ranking: Option<u32>,
    pub tuition: TuitionRange,
    pub fields: Vec<String>,
    pub languages: Vec<String>,
    pub deadlines: Vec<Deadline>,
    pub programs: Vec<Program>,
    pub entry_criteria: Vec<EntryCriterion>,
}

impl University {
    pub fn first_deadline(&self) -> Option<&Deadline> {
        self.deadlines.first()
    }

    pub fn earliest_deadline(&self) -> Option<NaiveDate> {
        self.deadlines.iter().map(|deadline| deadline.date).min()
    }

    pub fn offers_any_field<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        wanted.into_iter().any(|field| self.fields.contains(field))
    }

    pub fn teaches_in_any<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        wanted
            .into_iter()
            .any(|language| self.languages.contains(language))
    }
}

/// Distinct filter options derived from the catalog, sorted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub countries: Vec<String>,
    pub fields: Vec<String>,
    pub languages: Vec<String>,
}

/// Validation and parsing failures raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("duplicate university id '{0}'")]
    DuplicateId(String),
    #[error("university '{id}' lists no fields of study")]
    MissingFields { id: String },
    #[error("university '{id}' lists no instruction languages")]
    MissingLanguages { id: String },
    #[error("university '{id}' has tuition minimum {min} above maximum {max}")]
    InvertedTuition { id: String, min: u32, max: u32 },
    #[error("university '{id}' has unparseable deadline date '{value}'")]
    InvalidDate { id: String, value: String },
    #[error("university '{id}' has malformed entry '{value}'")]
    MalformedEntry { id: String, value: String },
}

/// In-memory catalog with id lookup. Records are never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    universities: Vec<University>,
    index: HashMap<UniversityId, usize>,
}

impl Catalog {
    pub fn new(universities: Vec<University>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(universities.len());
        for (position, university) in universities.iter().enumerate() {
            validate(university)?;
            if index.insert(university.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(university.id.0.clone()));
            }
        }

        Ok(Self {
            universities,
            index,
        })
    }

    /// Small demo catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_reader(BUILTIN_CATALOG.as_bytes())
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::new(loader::parse_seed(reader)?)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::new(import::parse_rows(reader)?)
    }

    /// Load a catalog file, picking the CSV importer for `.csv` paths and JSON otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let catalog = if is_csv {
            Self::from_csv_reader(file)?
        } else {
            Self::from_json_reader(file)?
        };

        tracing::info!(
            path = %path.display(),
            universities = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn universities(&self) -> &[University] {
        &self.universities
    }

    pub fn get(&self, id: &UniversityId) -> Option<&University> {
        self.index
            .get(id)
            .and_then(|position| self.universities.get(*position))
    }

    pub fn len(&self) -> usize {
        self.universities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
    }

    pub fn facets(&self) -> Facets {
        let mut countries = BTreeSet::new();
        let mut fields = BTreeSet::new();
        let mut languages = BTreeSet::new();

        for university in &self.universities {
            countries.insert(university.country.clone());
            fields.extend(university.fields.iter().cloned());
            languages.extend(university.languages.iter().cloned());
        }

        Facets {
            countries: countries.into_iter().collect(),
            fields: fields.into_iter().collect(),
            languages: languages.into_iter().collect(),
        }
    }

    /// Smallest minimum and largest maximum tuition across the catalog; `0..=0` when empty.
    pub fn tuition_bounds(&self) -> TuitionRange {
        let min = self.universities.iter().map(|u| u.tuition.min).min();
        let max = self.universities.iter().map(|u| u.tuition.max).max();
        match (min, max) {
            (Some(min), Some(max)) => TuitionRange::new(min, max),
            _ => TuitionRange::new(0, 0),
        }
    }
}

fn validate(university: &University) -> Result<(), CatalogError> {
    if university.fields.is_empty() {
        return Err(CatalogError::MissingFields {
            id: university.id.0.clone(),
        });
    }
    if university.languages.is_empty() {
        return Err(CatalogError::MissingLanguages {
            id: university.id.0.clone(),
        });
    }
    if university.tuition.min > university.tuition.max {
        return Err(CatalogError::InvertedTuition {
            id: university.id.0.clone(),
            min: university.tuition.min,
            max: university.tuition.max,
        });
    }
    Ok(())
}
