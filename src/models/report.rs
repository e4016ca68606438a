use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Task, TaskStatus};

/// Optional narrowing of the completion report.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReportScope {
    pub project_id: Option<Uuid>,
    pub due_after: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}

impl ReportScope {
    pub fn includes(&self, task: &Task) -> bool {
        if self.project_id.is_some() && task.project_id != self.project_id {
            return false;
        }
        if let Some(after) = self.due_after {
            if !task.due_date.is_some_and(|due| due >= after) {
                return false;
            }
        }
        if let Some(before) = self.due_before {
            if !task.due_date.is_some_and(|due| due <= before) {
                return false;
            }
        }
        true
    }
}

/// Task counts grouped by status.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub total_tasks: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
    /// Percentage of tasks that are done, 0 when there are none.
    pub completion_rate: f64,
}

impl CompletionReport {
    /// Builds the report from `(status, count)` rows as returned by a `GROUP BY`.
    pub fn from_counts(counts: impl IntoIterator<Item = (TaskStatus, i64)>) -> Self {
        let mut report = Self::default();
        for (status, count) in counts {
            match status {
                TaskStatus::Pending => report.pending += count,
                TaskStatus::InProgress => report.in_progress += count,
                TaskStatus::Done => report.done += count,
            }
            report.total_tasks += count;
        }
        if report.total_tasks > 0 {
            report.completion_rate = report.done as f64 / report.total_tasks as f64 * 100.0;
        }
        report
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProjectStats {
    pub total_projects: i64,
    /// Projects with at least one task that is not done.
    pub active_projects: i64,
    /// Projects that have tasks, all of them done.
    pub completed_projects: i64,
    pub projects_with_tasks: i64,
}
