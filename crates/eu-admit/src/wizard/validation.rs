use std::collections::BTreeMap;

use crate::profile::{Academics, Preferences};

use super::WizardStep;

/// Field path to human-readable message, e.g. `tests.ielts -> "Required."`.
pub type StepErrors = BTreeMap<String, String>;

pub const SHORTLIST_MIN: usize = 5;
pub const SHORTLIST_MAX: usize = 8;

struct ScoreRange {
    key: &'static str,
    min: f64,
    max: f64,
}

const TEST_RANGES: [ScoreRange; 3] = [
    ScoreRange {
        key: "ielts",
        min: 0.0,
        max: 9.0,
    },
    ScoreRange {
        key: "toefl",
        min: 0.0,
        max: 120.0,
    },
    ScoreRange {
        key: "sat",
        min: 400.0,
        max: 1600.0,
    },
];

pub(crate) fn academics(academics: &Academics) -> StepErrors {
    let mut errors = StepErrors::new();
    let max = academics.scale.max();

    match academics.gpa {
        None => {
            errors.insert("gpa".to_string(), "Enter your GPA.".to_string());
        }
        Some(gpa) if !gpa.is_finite() => {
            errors.insert("gpa".to_string(), "Provide a numeric GPA.".to_string());
        }
        Some(gpa) if !(0.0..=max).contains(&gpa) => {
            errors.insert(
                "gpa".to_string(),
                format!("GPA must be between 0 and {}.", academics.scale.label()),
            );
        }
        Some(_) => {}
    }

    let tests = &academics.tests;
    let values = [
        tests.ielts,
        tests.toefl.map(f64::from),
        tests.sat.map(f64::from),
    ];
    for (range, value) in TEST_RANGES.iter().zip(values) {
        let message = match value {
            None => "Required.".to_string(),
            Some(value) if !(range.min..=range.max).contains(&value) => {
                format!("Must be between {} and {}.", range.min, range.max)
            }
            Some(_) => continue,
        };
        errors.insert(format!("tests.{}", range.key), message);
    }

    errors
}

pub(crate) fn preferences(preferences: &Preferences) -> StepErrors {
    let mut errors = StepErrors::new();

    if preferences.countries.is_empty() {
        errors.insert(
            "countries".to_string(),
            "Choose at least one country.".to_string(),
        );
    }
    if preferences.fields.is_empty() {
        errors.insert("fields".to_string(), "Choose at least one field.".to_string());
    }
    if preferences.languages.is_empty() {
        errors.insert(
            "languages".to_string(),
            "Choose at least one language.".to_string(),
        );
    }

    match preferences.budget() {
        None => {
            errors.insert(
                "budget".to_string(),
                "Enter both a minimum and maximum budget.".to_string(),
            );
        }
        Some((min, max)) if min > max => {
            errors.insert(
                "budget".to_string(),
                "Ensure the minimum is less than the maximum and both are non-negative.".to_string(),
            );
        }
        Some(_) => {}
    }

    errors
}

pub(crate) fn shortlist(len: usize) -> StepErrors {
    let mut errors = StepErrors::new();
    if !(SHORTLIST_MIN..=SHORTLIST_MAX).contains(&len) {
        errors.insert(
            "shortlist".to_string(),
            format!("Pick between {SHORTLIST_MIN} and {SHORTLIST_MAX} universities to continue."),
        );
    }
    errors
}

pub(crate) fn step(
    step: WizardStep,
    academics_input: &Academics,
    preferences_input: &Preferences,
    shortlist_len: usize,
) -> StepErrors {
    match step {
        WizardStep::Academics => academics(academics_input),
        WizardStep::Preferences => preferences(preferences_input),
        WizardStep::Recommendations => shortlist(shortlist_len),
        WizardStep::Review => StepErrors::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{GpaScale, TestScores};

    fn complete_academics() -> Academics {
        Academics {
            gpa: Some(3.6),
            scale: GpaScale::FourPoint,
            tests: TestScores {
                ielts: Some(7.5),
                toefl: Some(100),
                sat: Some(1350),
            },
        }
    }

    #[test]
    fn complete_academics_pass() {
        assert!(academics(&complete_academics()).is_empty());
    }

    #[test]
    fn gpa_is_bounded_by_scale() {
        let mut input = complete_academics();
        input.gpa = Some(8.5);
        let errors = academics(&input);
        assert_eq!(errors["gpa"], "GPA must be between 0 and 4.0.");

        input.scale = GpaScale::TenPoint;
        assert!(academics(&input).is_empty());
    }

    #[test]
    fn missing_and_out_of_range_tests_are_reported() {
        let mut input = complete_academics();
        input.gpa = None;
        input.tests.ielts = Some(9.5);
        input.tests.sat = None;
        input.tests.toefl = Some(120);

        let errors = academics(&input);
        assert_eq!(errors["gpa"], "Enter your GPA.");
        assert_eq!(errors["tests.ielts"], "Must be between 0 and 9.");
        assert_eq!(errors["tests.sat"], "Required.");
        assert!(!errors.contains_key("tests.toefl"));
    }

    #[test]
    fn preferences_need_every_section() {
        let errors = preferences(&Preferences::default());
        assert_eq!(errors.len(), 4);

        let inverted = Preferences {
            countries: ["DE".to_string()].into_iter().collect(),
            fields: ["Engineering".to_string()].into_iter().collect(),
            languages: ["English".to_string()].into_iter().collect(),
            budget_min: Some(9000),
            budget_max: Some(3000),
        };
        let errors = preferences(&inverted);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("budget"));
    }

    #[test]
    fn shortlist_size_window() {
        assert!(!shortlist(4).is_empty());
        assert!(shortlist(5).is_empty());
        assert!(shortlist(8).is_empty());
        assert!(!shortlist(9).is_empty());
    }
}
