use super::normalizer::{canonical_languages, normalize_label, normalize_values, parse_date};
use super::{
    CatalogError, Deadline, EntryCriterion, Program, TuitionRange, University, UniversityId,
};
use serde::Deserialize;
use std::io::Read;

/// Seed record as published in the JSON dataset, including the legacy singular `language`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecord {
    id: String,
    name: String,
    #[serde(default)]
    city: String,
    country: String,
    #[serde(default)]
    ranking: Option<u32>,
    #[serde(rename = "tuitionEUR", alias = "tuition")]
    tuition: SeedTuition,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    languages: Option<Vec<String>>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    deadlines: Vec<SeedDeadline>,
    #[serde(default)]
    programs: Vec<SeedProgram>,
    #[serde(default, alias = "entry_criteria")]
    entry_criteria: Vec<SeedCriterion>,
}

#[derive(Debug, Deserialize)]
struct SeedTuition {
    min: u32,
    max: u32,
}

#[derive(Debug, Deserialize)]
struct SeedDeadline {
    label: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct SeedProgram {
    name: String,
    #[serde(default)]
    degree: String,
}

#[derive(Debug, Deserialize)]
struct SeedCriterion {
    label: String,
    value: String,
}

pub(crate) fn parse_seed<R: Read>(reader: R) -> Result<Vec<University>, CatalogError> {
    let records: Vec<SeedRecord> = serde_json::from_reader(reader)?;
    records.into_iter().map(SeedRecord::into_university).collect()
}

impl SeedRecord {
    fn into_university(self) -> Result<University, CatalogError> {
        let id = normalize_label(&self.id);

        let mut deadlines = Vec::with_capacity(self.deadlines.len());
        for deadline in self.deadlines {
            let date = parse_date(&deadline.date).ok_or_else(|| CatalogError::InvalidDate {
                id: id.clone(),
                value: deadline.date.clone(),
            })?;
            deadlines.push(Deadline {
                label: normalize_label(&deadline.label),
                date,
            });
        }

        Ok(University {
            id: UniversityId(id),
            name: normalize_label(&self.name),
            city: normalize_label(&self.city),
            country: normalize_label(&self.country),
            ranking: self.ranking,
            tuition: TuitionRange::new(self.tuition.min, self.tuition.max),
            fields: normalize_values(self.fields),
            languages: canonical_languages(self.languages, self.language),
            deadlines,
            programs: self
                .programs
                .into_iter()
                .map(|program| Program {
                    name: normalize_label(&program.name),
                    degree: normalize_label(&program.degree),
                })
                .collect(),
            entry_criteria: self
                .entry_criteria
                .into_iter()
                .map(|criterion| EntryCriterion {
                    label: normalize_label(&criterion.label),
                    value: criterion.value.trim().to_string(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn accepts_legacy_language_field() {
        let json = r#"[{
            "id": "uva",
            "name": "University of Amsterdam",
            "city": "Amsterdam",
            "country": "NL",
            "ranking": 53,
            "tuitionEUR": { "min": 2314, "max": 15000 },
            "fields": ["Economics", "Economics"],
            "language": "English",
            "logo": "https://example.org/uva.png",
            "deadlines": [{ "label": "Regular", "date": "2026-01-15" }],
            "programs": [{ "name": "BSc Economics", "degree": "BSc" }],
            "entryCriteria": [{ "label": "IELTS", "value": "6.5 overall" }]
        }]"#;

        let universities = parse_seed(json.as_bytes()).expect("seed parses");
        let uva = &universities[0];
        assert_eq!(uva.languages, vec!["English"]);
        assert_eq!(uva.fields, vec!["Economics"]);
        assert_eq!(
            uva.first_deadline().map(|d| d.date),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(uva.entry_criteria[0].value, "6.5 overall");
    }

    #[test]
    fn rejects_unparseable_deadline() {
        let json = r#"[{
            "id": "x", "name": "X", "country": "DE",
            "tuitionEUR": { "min": 0, "max": 0 },
            "fields": ["Law"], "languages": ["German"],
            "deadlines": [{ "label": "Regular", "date": "soon" }]
        }]"#;

        match parse_seed(json.as_bytes()) {
            Err(CatalogError::InvalidDate { id, value }) => {
                assert_eq!(id, "x");
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid date, got {other:?}"),
        }
    }
}
