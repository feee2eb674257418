//! Injectable state container for the student's profile, applications and compare selection.
//!
//! The store owns the mutable state and mirrors every profile or application change to a
//! [`StateStorage`] backend. The catalog is shared and immutable; the matching engines run on
//! borrowed slices of it.

mod storage;

#[cfg(test)]
pub(crate) mod tests;

pub use storage::{
    FileStorage, MemoryStorage, StateStorage, StorageError, APPLICATIONS_KEY, PROFILE_KEY,
    WIZARD_DRAFT_KEY,
};

use std::sync::Arc;

use chrono::NaiveDate;

use crate::applications::{
    summarize, Application, ApplicationId, ApplicationStatus, DashboardSummary, NewTask, Task,
    TaskId, TaskUpdate,
};
use crate::catalog::{Catalog, University, UniversityId};
use crate::config::MatchingConfig;
use crate::matching::{filter_and_sort, score_and_rank, FilterState, RankOptions, ScoredUniversity};
use crate::profile::{Profile, ProfileUpdate};
use crate::wizard::WizardDraft;

use storage::{load_json, save_json};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown university `{0}`")]
    UnknownUniversity(UniversityId),
    #[error("unknown application `{0}`")]
    UnknownApplication(ApplicationId),
    #[error("application `{application}` has no task `{task}`")]
    UnknownTask {
        application: ApplicationId,
        task: TaskId,
    },
    #[error("task label must not be empty")]
    EmptyTaskLabel,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct AppStore {
    catalog: Arc<Catalog>,
    storage: Arc<dyn StateStorage>,
    limits: MatchingConfig,
    profile: Profile,
    applications: Vec<Application>,
    compare: Vec<UniversityId>,
}

impl AppStore {
    /// Hydrate profile and applications from `storage`, falling back to defaults.
    pub fn new(catalog: Arc<Catalog>, storage: Arc<dyn StateStorage>) -> Self {
        let profile = load_json::<Profile>(storage.as_ref(), PROFILE_KEY).unwrap_or_default();
        let applications =
            load_json::<Vec<Application>>(storage.as_ref(), APPLICATIONS_KEY).unwrap_or_default();

        tracing::debug!(
            applications = applications.len(),
            completed_onboarding = profile.completed_onboarding,
            "app store hydrated"
        );

        Self {
            catalog,
            storage,
            limits: MatchingConfig::default(),
            profile,
            applications,
            compare: Vec::new(),
        }
    }

    pub fn in_memory(catalog: Arc<Catalog>) -> Self {
        Self::new(catalog, Arc::new(MemoryStorage::new()))
    }

    pub fn with_limits(mut self, limits: MatchingConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn limits(&self) -> &MatchingConfig {
        &self.limits
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|application| &application.id == id)
    }

    pub fn compare_ids(&self) -> &[UniversityId] {
        &self.compare
    }

    /// Universities currently selected for comparison, in selection order.
    pub fn compared(&self) -> Vec<&University> {
        self.compare
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    pub fn save_profile(&mut self, update: ProfileUpdate) -> Result<&Profile, StoreError> {
        self.profile.merge(update);
        self.persist_profile()?;
        Ok(&self.profile)
    }

    pub fn complete_onboarding(&mut self, update: ProfileUpdate) -> Result<&Profile, StoreError> {
        self.profile.merge(update);
        self.profile.completed_onboarding = true;
        self.persist_profile()?;
        tracing::info!("onboarding completed");
        Ok(&self.profile)
    }

    /// Start tracking `university_id`. Returns the existing application when one is already
    /// tracked for that university.
    pub fn add_application_draft(
        &mut self,
        university_id: &UniversityId,
    ) -> Result<&Application, StoreError> {
        if let Some(index) = self
            .applications
            .iter()
            .position(|application| &application.university_id == university_id)
        {
            return Ok(&self.applications[index]);
        }

        let university = self
            .catalog
            .get(university_id)
            .ok_or_else(|| StoreError::UnknownUniversity(university_id.clone()))?;
        let application = Application::draft_for(university);
        tracing::info!(application_id = %application.id, "application draft created");

        self.applications.push(application);
        self.persist_applications()?;
        let index = self.applications.len() - 1;
        Ok(&self.applications[index])
    }

    pub fn set_status(
        &mut self,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<&Application, StoreError> {
        let index = self.application_index(application_id)?;
        self.applications[index].status = status;
        self.persist_applications()?;
        Ok(&self.applications[index])
    }

    pub fn toggle_task(
        &mut self,
        application_id: &ApplicationId,
        task_id: &TaskId,
    ) -> Result<&Task, StoreError> {
        let (app_index, task_index) = self.task_index(application_id, task_id)?;
        let task = &mut self.applications[app_index].tasks[task_index];
        task.done = !task.done;
        self.persist_applications()?;
        Ok(&self.applications[app_index].tasks[task_index])
    }

    pub fn add_task(
        &mut self,
        application_id: &ApplicationId,
        task: NewTask,
    ) -> Result<&Task, StoreError> {
        let label = task.label.trim();
        if label.is_empty() {
            return Err(StoreError::EmptyTaskLabel);
        }

        let index = self.application_index(application_id)?;
        let application = &mut self.applications[index];
        let id = next_task_id(application);
        application.tasks.push(Task {
            id,
            label: label.to_string(),
            done: false,
            due_date: task.due_date,
        });

        self.persist_applications()?;
        let tasks = &self.applications[index].tasks;
        Ok(&tasks[tasks.len() - 1])
    }

    pub fn update_task(
        &mut self,
        application_id: &ApplicationId,
        task_id: &TaskId,
        update: TaskUpdate,
    ) -> Result<&Task, StoreError> {
        let (app_index, task_index) = self.task_index(application_id, task_id)?;
        let task = &mut self.applications[app_index].tasks[task_index];

        if let Some(label) = update.label {
            let label = label.trim();
            if label.is_empty() {
                return Err(StoreError::EmptyTaskLabel);
            }
            task.label = label.to_string();
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }

        self.persist_applications()?;
        Ok(&self.applications[app_index].tasks[task_index])
    }

    pub fn remove_task(
        &mut self,
        application_id: &ApplicationId,
        task_id: &TaskId,
    ) -> Result<Task, StoreError> {
        let (app_index, task_index) = self.task_index(application_id, task_id)?;
        let removed = self.applications[app_index].tasks.remove(task_index);
        self.persist_applications()?;
        Ok(removed)
    }

    /// Add or remove `university_id` from the compare selection. Additions beyond the compare
    /// limit are ignored. Returns whether the university is selected afterwards.
    pub fn toggle_compare(
        &mut self,
        university_id: &UniversityId,
        selected: bool,
    ) -> Result<bool, StoreError> {
        if self.catalog.get(university_id).is_none() {
            return Err(StoreError::UnknownUniversity(university_id.clone()));
        }

        let present = self.compare.contains(university_id);
        if !selected {
            self.compare.retain(|id| id != university_id);
            return Ok(false);
        }
        if present {
            return Ok(true);
        }
        if self.compare.len() >= self.limits.compare_limit {
            tracing::debug!(university_id = %university_id, "compare selection full");
            return Ok(false);
        }
        self.compare.push(university_id.clone());
        Ok(true)
    }

    pub fn clear_compare(&mut self) {
        self.compare.clear();
    }

    /// Recommendation strip for the current profile.
    pub fn recommendations(&self) -> Vec<ScoredUniversity<'_>> {
        let options = RankOptions::strip(self.profile.completed_onboarding)
            .with_limit(self.limits.strip_limit);
        score_and_rank(
            self.catalog.universities(),
            &self.profile.preferences,
            &options,
        )
    }

    pub fn search(&self, term: &str, filter: &FilterState) -> Vec<&University> {
        filter_and_sort(self.catalog.universities(), term, filter)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        summarize(&self.applications, &self.catalog, today)
    }

    pub fn wizard_draft(&self) -> Option<WizardDraft> {
        load_json(self.storage.as_ref(), WIZARD_DRAFT_KEY)
    }

    pub fn save_wizard_draft(&self, draft: &WizardDraft) -> Result<(), StoreError> {
        save_json(self.storage.as_ref(), WIZARD_DRAFT_KEY, draft)?;
        Ok(())
    }

    pub fn clear_wizard_draft(&self) -> Result<(), StoreError> {
        self.storage.remove(WIZARD_DRAFT_KEY)?;
        Ok(())
    }

    fn application_index(&self, id: &ApplicationId) -> Result<usize, StoreError> {
        self.applications
            .iter()
            .position(|application| &application.id == id)
            .ok_or_else(|| StoreError::UnknownApplication(id.clone()))
    }

    fn task_index(
        &self,
        application_id: &ApplicationId,
        task_id: &TaskId,
    ) -> Result<(usize, usize), StoreError> {
        let app_index = self.application_index(application_id)?;
        let task_index = self.applications[app_index]
            .tasks
            .iter()
            .position(|task| &task.id == task_id)
            .ok_or_else(|| StoreError::UnknownTask {
                application: application_id.clone(),
                task: task_id.clone(),
            })?;
        Ok((app_index, task_index))
    }

    fn persist_profile(&self) -> Result<(), StoreError> {
        save_json(self.storage.as_ref(), PROFILE_KEY, &self.profile)?;
        Ok(())
    }

    fn persist_applications(&self) -> Result<(), StoreError> {
        save_json(
            self.storage.as_ref(),
            APPLICATIONS_KEY,
            self.applications.as_slice(),
        )?;
        Ok(())
    }
}

fn next_task_id(application: &Application) -> TaskId {
    let mut sequence = application.tasks.len() + 1;
    loop {
        let candidate = TaskId(format!("task-{sequence}"));
        if !application.tasks.iter().any(|task| task.id == candidate) {
            return candidate;
        }
        sequence += 1;
    }
}
