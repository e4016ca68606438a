use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Repository;
use crate::error::AppError;
use crate::models::{
    NewUser, Pagination, Project, ProjectStats, ReportScope, Task, TaskFilter, TaskStatus, User,
};

#[derive(Default)]
struct State {
    next_user_id: i32,
    // Insertion order; listings walk these backwards for newest first.
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
}

impl State {
    fn project_owner(&self, project_id: Option<Uuid>) -> Option<i32> {
        let project_id = project_id?;
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.owner_id)
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Process-local repository with the same semantics as `PgRepository`.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: state.next_user_id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.is_active = user.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_users(&self, page: Pagination) -> Result<Vec<User>, AppError> {
        let state = self.state.read().await;
        Ok(page.window(state.users.iter().cloned()))
    }

    async fn create_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut state = self.state.write().await;
        state.projects.push(project.clone());
        Ok(project.clone())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let state = self.state.read().await;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(
        &self,
        owner_id: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Project>, AppError> {
        let state = self.state.read().await;
        let visible = state
            .projects
            .iter()
            .rev()
            .filter(|p| owner_id.map_or(true, |owner| p.owner_id == owner))
            .cloned();
        Ok(page.window(visible))
    }

    async fn update_project(&self, project: &Project) -> Result<Project, AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        *stored = project.clone();
        Ok(stored.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Ok(false);
        }
        state.tasks.retain(|t| t.project_id != Some(id));
        Ok(true)
    }

    async fn create_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        state.tasks.push(task.clone());
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        visible_to: Option<i32>,
        page: Pagination,
    ) -> Result<Vec<Task>, AppError> {
        let state = self.state.read().await;
        let matching = state
            .tasks
            .iter()
            .rev()
            .filter(|t| filter.matches(t))
            .filter(|t| {
                visible_to.map_or(true, |user_id| {
                    t.is_visible_to(user_id, state.project_owner(t.project_id))
                })
            })
            .cloned();
        Ok(page.window(matching))
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        *stored = task.clone();
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        Ok(state.tasks.len() != before)
    }

    async fn count_tasks_by_status(
        &self,
        scope: &ReportScope,
    ) -> Result<Vec<(TaskStatus, i64)>, AppError> {
        let state = self.state.read().await;
        let counts = TaskStatus::ALL
            .iter()
            .map(|status| {
                let count = state
                    .tasks
                    .iter()
                    .filter(|t| t.status == *status && scope.includes(t))
                    .count() as i64;
                (*status, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        Ok(counts)
    }

    async fn overdue_tasks(&self, today: NaiveDate) -> Result<Vec<Task>, AppError> {
        let state = self.state.read().await;
        let mut overdue: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.is_overdue(today))
            .cloned()
            .collect();
        overdue.sort_by_key(|t| t.due_date);
        Ok(overdue)
    }

    async fn project_stats(&self) -> Result<ProjectStats, AppError> {
        let state = self.state.read().await;
        let mut stats = ProjectStats {
            total_projects: state.projects.len() as i64,
            ..Default::default()
        };
        for project in &state.projects {
            let mut tasks = state
                .tasks
                .iter()
                .filter(|t| t.project_id == Some(project.id))
                .peekable();
            if tasks.peek().is_none() {
                continue;
            }
            stats.projects_with_tasks += 1;
            if tasks.any(|t| t.status != TaskStatus::Done) {
                stats.active_projects += 1;
            } else {
                stats.completed_projects += 1;
            }
        }
        Ok(stats)
    }
}
