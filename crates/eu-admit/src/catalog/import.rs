use super::normalizer::{normalize_label, parse_date, split_list};
use super::{CatalogError, Deadline, Program, TuitionRange, University, UniversityId};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Spreadsheet export row. List columns are `;`-separated; programs use `name|degree` and
/// deadlines use `label|YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    name: String,
    #[serde(default)]
    city: String,
    country: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ranking: Option<String>,
    tuition_min: u32,
    tuition_max: u32,
    fields: String,
    languages: String,
    #[serde(default)]
    programs: String,
    #[serde(default)]
    deadlines: String,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<University>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut universities = Vec::new();

    for row in csv_reader.deserialize::<CatalogRow>() {
        universities.push(row?.into_university()?);
    }

    Ok(universities)
}

impl CatalogRow {
    fn into_university(self) -> Result<University, CatalogError> {
        let id = normalize_label(&self.id);

        let ranking = match self.ranking.as_deref() {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| CatalogError::MalformedEntry {
                id: id.clone(),
                value: raw.to_string(),
            })?),
            None => None,
        };

        let programs = split_list(&self.programs)
            .into_iter()
            .map(|entry| {
                let (name, degree) = entry.split_once('|').unwrap_or((entry.as_str(), ""));
                Program {
                    name: normalize_label(name),
                    degree: normalize_label(degree),
                }
            })
            .collect();

        let mut deadlines = Vec::new();
        for entry in split_list(&self.deadlines) {
            let (label, raw_date) =
                entry
                    .split_once('|')
                    .ok_or_else(|| CatalogError::MalformedEntry {
                        id: id.clone(),
                        value: entry.clone(),
                    })?;
            let date = parse_date(raw_date).ok_or_else(|| CatalogError::InvalidDate {
                id: id.clone(),
                value: raw_date.trim().to_string(),
            })?;
            deadlines.push(Deadline {
                label: normalize_label(label),
                date,
            });
        }

        Ok(University {
            id: UniversityId(id),
            name: normalize_label(&self.name),
            city: normalize_label(&self.city),
            country: normalize_label(&self.country),
            ranking,
            tuition: TuitionRange::new(self.tuition_min, self.tuition_max),
            fields: split_list(&self.fields),
            languages: split_list(&self.languages),
            deadlines,
            programs,
            entry_criteria: Vec::new(),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str =
        "id,name,city,country,ranking,tuition_min,tuition_max,fields,languages,programs,deadlines\n";

    #[test]
    fn imports_lists_programs_and_deadlines() {
        let csv = format!(
            "{HEADER}kth,KTH Royal Institute of Technology,Stockholm,SE,89,0,15500,\
Engineering; Computer Science,English;Swedish,BSc Engineering|BSc;MSc Robotics|MSc,\
Early|2025-12-01;Regular|2026-01-15\n"
        );

        let universities = parse_rows(csv.as_bytes()).expect("csv parses");
        let kth = &universities[0];
        assert_eq!(kth.ranking, Some(89));
        assert_eq!(kth.fields, vec!["Engineering", "Computer Science"]);
        assert_eq!(kth.languages, vec!["English", "Swedish"]);
        assert_eq!(kth.programs[1].name, "MSc Robotics");
        assert_eq!(kth.programs[1].degree, "MSc");
        assert_eq!(kth.deadlines.len(), 2);
        assert_eq!(
            kth.earliest_deadline(),
            NaiveDate::from_ymd_opt(2025, 12, 1)
        );
    }

    #[test]
    fn blank_ranking_is_unranked() {
        let csv = format!("{HEADER}x,College X,Lyon,FR,,100,200,Law,French,,\n");
        let universities = parse_rows(csv.as_bytes()).expect("csv parses");
        assert_eq!(universities[0].ranking, None);
        assert!(universities[0].deadlines.is_empty());
    }

    #[test]
    fn deadline_without_date_is_malformed() {
        let csv = format!("{HEADER}x,College X,Lyon,FR,3,100,200,Law,French,,Regular\n");
        assert!(matches!(
            parse_rows(csv.as_bytes()),
            Err(CatalogError::MalformedEntry { .. })
        ));
    }
}
