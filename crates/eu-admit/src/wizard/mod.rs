//! Four-step onboarding wizard: academics, preferences, recommendations, review.
//!
//! The wizard works on a [`WizardDraft`] that callers persist through the app store between
//! steps. Moving forward validates the current step; moving back never does. Confirmation
//! writes the profile, opens one application per shortlisted university and drops the draft.

mod validation;


pub use validation::{StepErrors, SHORTLIST_MAX, SHORTLIST_MIN};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::applications::ApplicationId;
use crate::catalog::{Catalog, UniversityId};
use crate::matching::{score_and_rank, RankOptions, ScoredUniversity};
use crate::profile::{Academics, Preferences, ProfileUpdate};
use crate::store::{AppStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Academics,
    Preferences,
    Recommendations,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Academics,
        WizardStep::Preferences,
        WizardStep::Recommendations,
        WizardStep::Review,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Out-of-range indices clamp to the last step.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::Academics => "Academics",
            WizardStep::Preferences => "Preferences",
            WizardStep::Recommendations => "Recommendations",
            WizardStep::Review => "Review",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Which preference set a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    Country,
    Field,
    Language,
}

/// Persisted wizard progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardDraft {
    pub academics: Academics,
    pub preferences: Preferences,
    pub shortlist: Vec<UniversityId>,
    pub step: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{step} step is incomplete")]
    Invalid {
        step: WizardStep,
        errors: StepErrors,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WizardError {
    pub fn step_errors(&self) -> Option<&StepErrors> {
        match self {
            WizardError::Invalid { errors, .. } => Some(errors),
            WizardError::Store(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    draft: WizardDraft,
    limit: usize,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::from_draft(WizardDraft::default())
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draft(mut draft: WizardDraft) -> Self {
        draft.step = WizardStep::from_index(draft.step).index();
        Self {
            draft,
            limit: RankOptions::wizard(&[]).limit,
        }
    }

    /// Continue from the stored draft, or start fresh when none (or a corrupt one) exists.
    pub fn resume(store: &AppStore) -> Self {
        let wizard = store
            .wizard_draft()
            .map(Self::from_draft)
            .unwrap_or_default();
        wizard.with_limit(store.limits().wizard_limit)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::from_index(self.draft.step)
    }

    pub fn progress_percent(&self) -> u8 {
        let done = (self.step().index() + 1) as f64 / WizardStep::ALL.len() as f64;
        (done * 100.0).round() as u8
    }

    pub fn set_academics(&mut self, academics: Academics) {
        self.draft.academics = academics;
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.draft.preferences = preferences;
    }

    pub fn toggle_preference(&mut self, kind: PreferenceKind, value: &str) {
        let set = match kind {
            PreferenceKind::Country => &mut self.draft.preferences.countries,
            PreferenceKind::Field => &mut self.draft.preferences.fields,
            PreferenceKind::Language => &mut self.draft.preferences.languages,
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn set_budget(&mut self, min: Option<u32>, max: Option<u32>) {
        self.draft.preferences.budget_min = min;
        self.draft.preferences.budget_max = max;
    }

    pub fn validate(&self, step: WizardStep) -> Result<(), WizardError> {
        let errors = validation::step(
            step,
            &self.draft.academics,
            &self.draft.preferences,
            self.draft.shortlist.len(),
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WizardError::Invalid { step, errors })
        }
    }

    /// Validate the current step and advance. The review step is terminal.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let current = self.step();
        self.validate(current)?;
        self.draft.step = WizardStep::from_index(current.index() + 1).index();
        Ok(self.step())
    }

    pub fn back(&mut self) -> WizardStep {
        self.draft.step = self.draft.step.saturating_sub(1);
        self.step()
    }

    /// Fit-ranked universities for the draft preferences, followed by shortlisted universities
    /// that did not make the cut.
    pub fn recommendations<'a>(&self, catalog: &'a Catalog) -> Vec<ScoredUniversity<'a>> {
        let options = RankOptions::wizard(&self.draft.shortlist).with_limit(self.limit);
        score_and_rank(catalog.universities(), &self.draft.preferences, &options)
    }

    pub fn shortlist(&self) -> &[UniversityId] {
        &self.draft.shortlist
    }

    pub fn set_shortlisted(&mut self, id: &UniversityId, selected: bool) {
        let present = self.draft.shortlist.contains(id);
        if selected && !present {
            self.draft.shortlist.push(id.clone());
        } else if !selected {
            self.draft.shortlist.retain(|existing| existing != id);
        }
    }

    pub fn select_all(&mut self, catalog: &Catalog) {
        let ids: Vec<UniversityId> = self
            .recommendations(catalog)
            .iter()
            .map(|scored| scored.university.id.clone())
            .collect();
        self.draft.shortlist = ids;
    }

    pub fn clear_shortlist(&mut self) {
        self.draft.shortlist.clear();
    }

    pub fn remove_from_shortlist(&mut self, id: &UniversityId) {
        self.set_shortlisted(id, false);
    }

    pub fn save(&self, store: &AppStore) -> Result<(), WizardError> {
        store.save_wizard_draft(&self.draft)?;
        Ok(())
    }

    /// Complete onboarding from the draft and open an application per shortlisted university.
    pub fn confirm(self, store: &mut AppStore) -> Result<Vec<ApplicationId>, WizardError> {
        for step in [
            WizardStep::Academics,
            WizardStep::Preferences,
            WizardStep::Recommendations,
        ] {
            self.validate(step)?;
        }

        let unknown: Vec<&UniversityId> = self
            .draft
            .shortlist
            .iter()
            .filter(|id| store.catalog().get(id).is_none())
            .collect();
        if !unknown.is_empty() {
            let listed = unknown
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let mut errors = StepErrors::new();
            errors.insert(
                "shortlist".to_string(),
                format!("Unknown universities: {listed}."),
            );
            return Err(WizardError::Invalid {
                step: WizardStep::Review,
                errors,
            });
        }

        let WizardDraft {
            academics,
            preferences,
            shortlist,
            ..
        } = self.draft;

        store.complete_onboarding(ProfileUpdate {
            academics: Some(academics),
            preferences: Some(preferences),
        })?;

        let mut created = Vec::with_capacity(shortlist.len());
        for id in &shortlist {
            created.push(store.add_application_draft(id)?.id.clone());
        }
        store.clear_wizard_draft()?;

        tracing::info!(applications = created.len(), "wizard confirmed");
        Ok(created)
    }
}
