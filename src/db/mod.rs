//! Persistence layer.
//!
//! `Repository` is the contract the services are written against. `PgRepository`
//! is the production implementation on PostgreSQL; `MemoryRepository` keeps the
//! same rows in process and backs the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    NewUser, Pagination, Project, ProjectStats, ReportScope, Task, TaskFilter, TaskStatus, User,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Inserts a user; fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Persists name, email and the active flag; fails with `AppError::Conflict`
    /// when the email is taken.
    async fn update_user(&self, user: &User) -> Result<User, AppError>;

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, AppError>;

    async fn create_project(&self, project: &Project) -> Result<Project, AppError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError>;

    /// Newest first; `owner_id` restricts the listing to one owner.
    async fn list_projects(
        &self,
        owner_id: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Project>, AppError>;

    async fn update_project(&self, project: &Project) -> Result<Project, AppError>;

    /// Deletes the project and its tasks. Returns whether a row was removed.
    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError>;

    async fn create_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Newest first. With `visible_to` set, only tasks that user owns, is
    /// assigned to, or whose project the user owns are returned.
    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        visible_to: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError>;

    async fn update_task(&self, task: &Task) -> Result<Task, AppError>;

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;

    /// `(status, count)` for every status that has at least one task in scope.
    async fn count_tasks_by_status(
        &self,
        scope: &ReportScope,
    ) -> Result<Vec<(TaskStatus, i64)>, AppError>;

    /// Tasks due strictly before `today` that are not done, earliest first.
    async fn overdue_tasks(&self, today: NaiveDate) -> Result<Vec<Task>, AppError>;

    async fn project_stats(&self) -> Result<ProjectStats, AppError>;
}
