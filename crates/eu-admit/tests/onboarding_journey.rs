//! A student's journey from a fresh profile to tracked applications, persisted to disk and
//! picked up again by a new store instance.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use eu_admit::applications::{ApplicationId, DeadlineSeverity, NewTask, TaskId};
use eu_admit::catalog::{Catalog, UniversityId};
use eu_admit::profile::{Academics, GpaScale, Preferences, TestScores};
use eu_admit::store::{AppStore, FileStorage, StateStorage, WIZARD_DRAFT_KEY};
use eu_admit::wizard::{Wizard, WizardStep};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eu-admit-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn open_store(dir: &Path) -> AppStore {
    let catalog = Arc::new(Catalog::builtin().expect("builtin catalog"));
    AppStore::new(catalog, Arc::new(FileStorage::new(dir)))
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn wizard_progress_and_applications_survive_restarts() {
    let dir = scratch_dir("journey");

    {
        let store = open_store(&dir);
        assert!(!store.profile().completed_onboarding);

        let mut wizard = Wizard::resume(&store);
        wizard.set_academics(Academics {
            gpa: Some(8.9),
            scale: GpaScale::TenPoint,
            tests: TestScores {
                ielts: Some(7.0),
                toefl: Some(98),
                sat: Some(1310),
            },
        });
        wizard.next().expect("academics valid");
        wizard.save(&store).expect("draft saved");
    }

    let mut store = open_store(&dir);
    let mut wizard = Wizard::resume(&store);
    assert_eq!(wizard.step(), WizardStep::Preferences);

    wizard.set_preferences(Preferences {
        countries: set(&["ES", "IT"]),
        fields: set(&["Economics", "Law"]),
        languages: set(&["English"]),
        budget_min: Some(1000),
        budget_max: Some(16_000),
    });
    wizard.next().expect("preferences valid");
    for id in ["uc3m", "bocconi", "sciencespo", "ku-leuven", "uva"] {
        wizard.set_shortlisted(&UniversityId::new(id), true);
    }
    wizard.next().expect("shortlist valid");

    let created = wizard.confirm(&mut store).expect("confirmed");
    assert_eq!(created.len(), 5);

    let storage = FileStorage::new(&dir);
    assert_eq!(storage.read(WIZARD_DRAFT_KEY).expect("readable"), None);

    let uc3m = ApplicationId("app-uc3m".to_string());
    store
        .add_task(
            &uc3m,
            NewTask {
                label: "Apostille diploma".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 6, 20),
            },
        )
        .expect("task added");
    store
        .toggle_task(&uc3m, &TaskId("draft-personal-statement".to_string()))
        .expect("task toggled");

    let reopened = open_store(&dir);
    assert!(reopened.profile().completed_onboarding);
    assert_eq!(reopened.applications().len(), 5);

    let today = NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date");
    let summary = reopened.dashboard(today);
    let uc3m_card = summary
        .applications
        .iter()
        .find(|card| card.application_id == uc3m)
        .expect("uc3m card");
    assert_eq!(uc3m_card.total_tasks, 4);
    assert_eq!(uc3m_card.progress_percent, 25);

    let apostille = summary
        .events
        .iter()
        .find(|event| event.label == "Apostille diploma (Universidad Carlos III de Madrid)")
        .expect("task event");
    assert_eq!(apostille.severity, DeadlineSeverity::High);

    let strip = reopened.recommendations();
    assert_eq!(strip.len(), 6);
    let top: Vec<&str> = strip[..2]
        .iter()
        .map(|scored| scored.university.country.as_str())
        .collect();
    assert!(top.iter().all(|country| *country == "ES" || *country == "IT"));

    let _ = std::fs::remove_dir_all(&dir);
}
