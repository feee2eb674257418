use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Grading scale the GPA was reported on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpaScale {
    #[default]
    #[serde(rename = "4.0", alias = "4")]
    FourPoint,
    #[serde(rename = "10", alias = "10.0")]
    TenPoint,
}

impl GpaScale {
    pub const fn max(self) -> f64 {
        match self {
            GpaScale::FourPoint => 4.0,
            GpaScale::TenPoint => 10.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GpaScale::FourPoint => "4.0",
            GpaScale::TenPoint => "10",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestScores {
    pub ielts: Option<f64>,
    pub toefl: Option<u16>,
    pub sat: Option<u16>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Academics {
    pub gpa: Option<f64>,
    pub scale: GpaScale,
    pub tests: TestScores,
}

/// What the student is looking for. Empty sets and absent budget bounds express no preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub countries: BTreeSet<String>,
    pub fields: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
}

impl Preferences {
    /// Both budget bounds, or `None` when either is missing.
    pub fn budget(&self) -> Option<(u32, u32)> {
        match (self.budget_min, self.budget_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
            && self.fields.is_empty()
            && self.languages.is_empty()
            && self.budget().is_none()
    }
}

/// Student profile owned by the app store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub academics: Academics,
    pub preferences: Preferences,
    pub completed_onboarding: bool,
}

/// Partial profile submitted by a save; absent sections keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub academics: Option<Academics>,
    pub preferences: Option<Preferences>,
}

impl Profile {
    pub fn merge(&mut self, update: ProfileUpdate) {
        if let Some(academics) = update.academics {
            self.academics = academics;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_requires_both_bounds() {
        let mut preferences = Preferences {
            budget_min: Some(0),
            ..Preferences::default()
        };
        assert_eq!(preferences.budget(), None);
        preferences.budget_max = Some(6000);
        assert_eq!(preferences.budget(), Some((0, 6000)));
    }

    #[test]
    fn merge_keeps_untouched_sections() {
        let mut profile = Profile {
            academics: Academics {
                gpa: Some(3.7),
                ..Academics::default()
            },
            ..Profile::default()
        };

        profile.merge(ProfileUpdate {
            preferences: Some(Preferences {
                countries: ["NL".to_string()].into_iter().collect(),
                ..Preferences::default()
            }),
            ..ProfileUpdate::default()
        });

        assert_eq!(profile.academics.gpa, Some(3.7));
        assert!(profile.preferences.countries.contains("NL"));
        assert!(!profile.completed_onboarding);
    }

    #[test]
    fn partial_academics_fall_back_to_defaults() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"academics":{"gpa":3.5,"tests":{"ielts":7.0}}}"#)
                .expect("partial academics parse");
        let academics = update.academics.expect("academics present");
        assert_eq!(academics.gpa, Some(3.5));
        assert_eq!(academics.scale, GpaScale::FourPoint);
        assert_eq!(academics.tests.ielts, Some(7.0));
        assert_eq!(academics.tests.toefl, None);
    }

    #[test]
    fn stored_profile_without_scale_keeps_preferences() {
        let stored = serde_json::json!({
            "academics": { "gpa": 8.1 },
            "preferences": { "countries": ["IT"] },
            "completed_onboarding": true,
        });
        let profile: Profile = serde_json::from_value(stored).expect("older profile parses");
        assert_eq!(profile.academics.scale, GpaScale::FourPoint);
        assert!(profile.preferences.countries.contains("IT"));
        assert!(profile.completed_onboarding);
    }

    #[test]
    fn scale_accepts_original_labels() {
        let scale: GpaScale = serde_json::from_str("\"10\"").expect("parses");
        assert_eq!(scale, GpaScale::TenPoint);
        assert_eq!(scale.max(), 10.0);
        let scale: GpaScale = serde_json::from_str("\"4.0\"").expect("parses");
        assert_eq!(scale, GpaScale::FourPoint);
    }
}
