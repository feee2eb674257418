//! Tracked university applications and their checklist tasks.

mod dashboard;

pub use dashboard::{
    summarize, ApplicationCard, CalendarEvent, DashboardSummary, DeadlineSeverity, StatusCounts,
};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{University, UniversityId};

/// Identifier wrapper for tracked applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Applications are keyed by the university they target.
    pub fn for_university(university_id: &UniversityId) -> Self {
        Self(format!("app-{}", university_id.0))
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of an application from the student's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    InProgress,
    Submitted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::InProgress => "In progress",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub const fn ordered() -> [ApplicationStatus; 4] {
        [
            ApplicationStatus::InProgress,
            ApplicationStatus::Submitted,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub label: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub university_id: UniversityId,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub next_deadline: Option<NaiveDate>,
}

const DRAFT_TASKS: [(&str, &str); 3] = [
    ("draft-personal-statement", "Draft personal statement"),
    ("request-recommendation", "Request recommendation letter"),
    ("prepare-financial-docs", "Prepare financial documents"),
];

impl Application {
    /// Fresh in-progress application with the default checklist and the university's first
    /// listed deadline.
    pub fn draft_for(university: &University) -> Self {
        Self {
            id: ApplicationId::for_university(&university.id),
            university_id: university.id.clone(),
            status: ApplicationStatus::InProgress,
            tasks: DRAFT_TASKS
                .iter()
                .map(|(id, label)| Task {
                    id: TaskId((*id).to_string()),
                    label: (*label).to_string(),
                    done: false,
                    due_date: None,
                })
                .collect(),
            next_deadline: university.first_deadline().map(|deadline| deadline.date),
        }
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| task.done).count()
    }

    /// Whole-number completion percentage; 0 when there are no tasks.
    pub fn progress_percent(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        let ratio = self.completed_tasks() as f64 / self.tasks.len() as f64;
        (ratio * 100.0).round() as u8
    }
}

/// Checklist entry submitted by the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub label: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial task edit. `due_date: Some(None)` clears the due date; an absent key keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}
