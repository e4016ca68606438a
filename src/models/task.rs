use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::deserialize_present;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Calendar day the task is due.
    pub due_date: Option<NaiveDate>,
    /// The user who created the task.
    pub owner_id: i32,
    /// The user responsible for the task.
    pub assignee_id: Option<i32>,
    pub project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub due_date: Option<NaiveDate>,

    /// Defaults to the creating user.
    pub assignee_id: Option<i32>,

    pub project_id: Option<Uuid>,
}

/// Partial update of a task. Absent fields keep their value; explicit `null`
/// clears the nullable ones.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_task_update"))]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assignee_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub project_id: Option<Option<Uuid>>,
}

fn validate_task_update(update: &TaskUpdate) -> Result<(), ValidationError> {
    match &update.description {
        Some(Some(description)) if description.chars().count() > 1000 => {
            Err(ValidationError::new("description_too_long"))
        }
        _ => Ok(()),
    }
}

/// Query parameters for filtering tasks when listing them. All set filters
/// must hold at once.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Uuid>,
    pub assignee_id: Option<i32>,
    /// Inclusive lower bound on the due date.
    pub due_after: Option<NaiveDate>,
    /// Inclusive upper bound on the due date.
    pub due_before: Option<NaiveDate>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

impl TaskFilter {
    /// In-process form of the filter; the SQL repository builds the same
    /// conditions as a `WHERE` clause.
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if self.project_id.is_some() && task.project_id != self.project_id {
            return false;
        }
        if self.assignee_id.is_some() && task.assignee_id != self.assignee_id {
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
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

impl Task {
    /// Creates a new `Task` from `TaskInput`; the creator owns it and is the
    /// assignee unless one is named.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            owner_id,
            assignee_id: Some(input.assignee_id.unwrap_or(owner_id)),
            project_id: input.project_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(assignee_id) = update.assignee_id {
            self.assignee_id = assignee_id;
        }
        if let Some(project_id) = update.project_id {
            self.project_id = project_id;
        }
        self.updated_at = Utc::now();
    }

    /// Whether a regular user may see and modify this task: they created it, are
    /// assigned to it, or own its project (`project_owner`).
    pub fn is_visible_to(&self, user_id: i32, project_owner: Option<i32>) -> bool {
        self.owner_id == user_id
            || self.assignee_id == Some(user_id)
            || project_owner == Some(user_id)
    }

    /// Due before `today` and not finished.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Done && self.due_date.is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: Some("Test Description".to_string()),
            status: TaskStatus::Pending,
            priority: TaskPriority::High,
            due_date: None,
            assignee_id: None,
            project_id: None,
        }
    }

    #[test]
    fn test_task_creation() {
        let task = Task::new(input("Test Task"), 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.owner_id, 1);
        assert_eq!(task.assignee_id, Some(1));
        assert!(task.project_id.is_none());
    }

    #[test]
    fn test_task_defaults_from_json() {
        let input: TaskInput = serde_json::from_str(r#"{"title": "Defaults"}"#).unwrap();
        assert_eq!(input.status, TaskStatus::Pending);
        assert_eq!(input.priority, TaskPriority::Medium);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut long_description = input("Valid");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());

        let update = TaskUpdate {
            description: Some(Some("b".repeat(1001))),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in_progress");
        assert_eq!(serde_json::to_value(TaskPriority::Low).unwrap(), "low");
        assert!(serde_json::from_str::<TaskStatus>(r#""urgent""#).is_err());
    }

    #[test]
    fn test_partial_update_only_touches_given_fields() {
        let mut task = Task::new(input("Write docs"), 3);
        let update: TaskUpdate = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        task.apply(update);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.description.as_deref(), Some("Test Description"));
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.assignee_id, Some(3));
    }

    #[test]
    fn test_filter_matches_all_conditions() {
        let today = Utc::now().date_naive();
        let mut task = Task::new(input("Fix Login bug"), 1);
        task.due_date = Some(today);

        assert!(TaskFilter::default().matches(&task));

        let filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            priority: Some(TaskPriority::High),
            search: Some("login".to_string()),
            due_after: Some(today - Duration::days(1)),
            due_before: Some(today),
            ..Default::default()
        };
        assert!(filter.matches(&task));

        let wrong_status = TaskFilter {
            status: Some(TaskStatus::Done),
            search: Some("login".to_string()),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&task));

        let undated = TaskFilter {
            due_before: Some(today),
            ..Default::default()
        };
        task.due_date = None;
        assert!(!undated.matches(&task));
    }

    #[test]
    fn test_visibility() {
        let mut task = Task::new(input("Shared"), 1);
        task.assignee_id = Some(2);

        assert!(task.is_visible_to(1, None));
        assert!(task.is_visible_to(2, None));
        assert!(task.is_visible_to(3, Some(3)));
        assert!(!task.is_visible_to(3, Some(1)));
        assert!(!task.is_visible_to(4, None));
    }

    #[test]
    fn test_overdue() {
        let today = Utc::now().date_naive();
        let mut task = Task::new(input("Late"), 1);
        assert!(!task.is_overdue(today));

        task.due_date = Some(today - Duration::days(1));
        assert!(task.is_overdue(today));

        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));

        task.status = TaskStatus::InProgress;
        task.due_date = Some(today);
        assert!(!task.is_overdue(today));
    }
}
