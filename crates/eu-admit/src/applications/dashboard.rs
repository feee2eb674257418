use chrono::NaiveDate;
use serde::Serialize;

use super::{Application, ApplicationId, ApplicationStatus};
use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub in_progress: usize,
    pub submitted: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn from_applications(applications: &[Application]) -> Self {
        let mut counts = Self::default();
        for application in applications {
            match application.status {
                ApplicationStatus::InProgress => counts.in_progress += 1,
                ApplicationStatus::Submitted => counts.submitted += 1,
                ApplicationStatus::Accepted => counts.accepted += 1,
                ApplicationStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: ApplicationStatus) -> usize {
        match status {
            ApplicationStatus::InProgress => self.in_progress,
            ApplicationStatus::Submitted => self.submitted,
            ApplicationStatus::Accepted => self.accepted,
            ApplicationStatus::Rejected => self.rejected,
        }
    }
}

/// Urgency bucket for calendar entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineSeverity {
    High,
    Medium,
    Low,
}

impl DeadlineSeverity {
    /// Within a week (including overdue) is high, within two weeks medium.
    pub fn for_days_remaining(days: i64) -> Self {
        if days <= 7 {
            DeadlineSeverity::High
        } else if days <= 14 {
            DeadlineSeverity::Medium
        } else {
            DeadlineSeverity::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DeadlineSeverity::High => "high",
            DeadlineSeverity::Medium => "medium",
            DeadlineSeverity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub date: NaiveDate,
    pub label: String,
    pub severity: DeadlineSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCard {
    pub application_id: ApplicationId,
    pub university_name: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub counts: StatusCounts,
    pub applications: Vec<ApplicationCard>,
    pub events: Vec<CalendarEvent>,
}

const UNKNOWN_UNIVERSITY: &str = "University";

/// Build KPI counts, application cards, and the date-ordered calendar as of `today`.
pub fn summarize(
    applications: &[Application],
    catalog: &Catalog,
    today: NaiveDate,
) -> DashboardSummary {
    let mut applications_view = Vec::with_capacity(applications.len());
    let mut events = Vec::new();

    for application in applications {
        let university_name = catalog
            .get(&application.university_id)
            .map(|university| university.name.as_str())
            .unwrap_or(UNKNOWN_UNIVERSITY);

        applications_view.push(ApplicationCard {
            application_id: application.id.clone(),
            university_name: university_name.to_string(),
            status: application.status,
            status_label: application.status.label(),
            completed_tasks: application.completed_tasks(),
            total_tasks: application.tasks.len(),
            progress_percent: application.progress_percent(),
            next_deadline: application.next_deadline,
        });

        if let Some(deadline) = application.next_deadline {
            events.push(CalendarEvent {
                id: format!("{}-deadline", application.id.0),
                date: deadline,
                label: format!("{university_name} deadline"),
                severity: DeadlineSeverity::for_days_remaining((deadline - today).num_days()),
            });
        }

        for task in &application.tasks {
            let Some(due) = task.due_date else {
                continue;
            };
            events.push(CalendarEvent {
                id: format!("{}-{}", application.id.0, task.id.0),
                date: due,
                label: format!("{} ({university_name})", task.label),
                severity: DeadlineSeverity::for_days_remaining((due - today).num_days()),
            });
        }
    }

    events.sort_by(|a, b| a.date.cmp(&b.date));

    DashboardSummary {
        counts: StatusCounts::from_applications(applications),
        applications: applications_view,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::{Task, TaskId};
    use crate::catalog::UniversityId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn application(id: &str, status: ApplicationStatus) -> Application {
        Application {
            id: ApplicationId(format!("app-{id}")),
            university_id: UniversityId::new(id),
            status,
            tasks: Vec::new(),
            next_deadline: None,
        }
    }

    #[test]
    fn severity_buckets() {
        assert_eq!(DeadlineSeverity::for_days_remaining(-3), DeadlineSeverity::High);
        assert_eq!(DeadlineSeverity::for_days_remaining(7), DeadlineSeverity::High);
        assert_eq!(DeadlineSeverity::for_days_remaining(8), DeadlineSeverity::Medium);
        assert_eq!(DeadlineSeverity::for_days_remaining(14), DeadlineSeverity::Medium);
        assert_eq!(DeadlineSeverity::for_days_remaining(15), DeadlineSeverity::Low);
    }

    #[test]
    fn counts_group_by_status() {
        let applications = vec![
            application("a", ApplicationStatus::InProgress),
            application("b", ApplicationStatus::InProgress),
            application("c", ApplicationStatus::Accepted),
        ];
        let counts = StatusCounts::from_applications(&applications);
        assert_eq!(counts.get(ApplicationStatus::InProgress), 2);
        assert_eq!(counts.get(ApplicationStatus::Accepted), 1);
        assert_eq!(counts.get(ApplicationStatus::Rejected), 0);
    }

    #[test]
    fn events_cover_deadlines_and_due_tasks() {
        let today = date(2026, 1, 1);
        let mut tracked = application("unknown", ApplicationStatus::InProgress);
        tracked.next_deadline = Some(date(2026, 1, 20));
        tracked.tasks = vec![
            Task {
                id: TaskId("essay".to_string()),
                label: "Essay".to_string(),
                done: false,
                due_date: Some(date(2026, 1, 5)),
            },
            Task {
                id: TaskId("visa".to_string()),
                label: "Visa".to_string(),
                done: true,
                due_date: None,
            },
        ];

        let summary = summarize(&[tracked], &Catalog::default(), today);

        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.events[0].id, "app-unknown-essay");
        assert_eq!(summary.events[0].label, "Essay (University)");
        assert_eq!(summary.events[0].severity, DeadlineSeverity::High);
        assert_eq!(summary.events[1].label, "University deadline");
        assert_eq!(summary.events[1].severity, DeadlineSeverity::Low);
        assert_eq!(summary.applications[0].progress_percent, 50);
    }
}
