use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::projects;
use crate::db::Repository;
use crate::error::AppError;
use crate::models::{Pagination, Task, TaskFilter, TaskInput, TaskUpdate, User};

async fn can_access(repo: &dyn Repository, user: &User, task: &Task) -> Result<bool, AppError> {
    if user.is_admin() {
        return Ok(true);
    }
    let project_owner = match task.project_id {
        Some(project_id) => repo.find_project(project_id).await?.map(|p| p.owner_id),
        None => None,
    };
    Ok(task.is_visible_to(user.id, project_owner))
}

/// A task may only point at a project the acting user can access, and at an
/// assignee that exists.
async fn check_references(
    repo: &dyn Repository,
    user: &User,
    project_id: Option<Uuid>,
    assignee_id: Option<i32>,
) -> Result<(), AppError> {
    if let Some(project_id) = project_id {
        let project = repo
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        if !projects::can_access(user, &project) {
            return Err(AppError::Forbidden(
                "Not authorized to add tasks to this project".into(),
            ));
        }
    }
    if let Some(assignee_id) = assignee_id {
        if repo.find_user_by_id(assignee_id).await?.is_none() {
            return Err(AppError::NotFound("Assignee not found".into()));
        }
    }
    Ok(())
}

pub async fn create(repo: &dyn Repository, user: &User, input: TaskInput) -> Result<Task, AppError> {
    input.validate()?;
    check_references(repo, user, input.project_id, input.assignee_id).await?;

    let task = repo.create_task(&Task::new(input, user.id)).await?;
    info!("user {} created task {}", user.id, task.id);
    Ok(task)
}

/// Filtered, paginated listing. Regular users only ever see tasks visible to
/// them; admins see every task.
pub async fn list(
    repo: &dyn Repository,
    user: &User,
    filter: &TaskFilter,
    page: Pagination,
) -> Result<Vec<Task>, AppError> {
    page.validate()?;
    let visible_to = if user.is_admin() { None } else { Some(user.id) };
    repo.list_tasks(filter, visible_to, page).await
}

/// `NotFound` if the task does not exist, `Forbidden` if the user may not see it.
pub async fn get(repo: &dyn Repository, user: &User, id: Uuid) -> Result<Task, AppError> {
    let task = repo
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !can_access(repo, user, &task).await? {
        warn!("user {} denied access to task {}", user.id, id);
        return Err(AppError::Forbidden("Not authorized to access this task".into()));
    }
    Ok(task)
}

/// Applies only the fields present in `update`. References are checked only
/// when they change.
pub async fn update(
    repo: &dyn Repository,
    user: &User,
    id: Uuid,
    update: TaskUpdate,
) -> Result<Task, AppError> {
    update.validate()?;
    let mut task = get(repo, user, id).await?;
    let new_project = update.project_id.flatten().filter(|p| task.project_id != Some(*p));
    let new_assignee = update.assignee_id.flatten().filter(|a| task.assignee_id != Some(*a));
    check_references(repo, user, new_project, new_assignee).await?;

    task.apply(update);
    repo.update_task(&task).await
}

pub async fn delete(repo: &dyn Repository, user: &User, id: Uuid) -> Result<(), AppError> {
    get(repo, user, id).await?;
    if !repo.delete_task(id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    info!("user {} deleted task {}", user.id, id);
    Ok(())
}
