use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::Repository;
use crate::error::AppError;
use crate::models::{Pagination, Project, ProjectInput, ProjectUpdate, User};

/// Admins reach every project, everyone else only their own.
pub fn can_access(user: &User, project: &Project) -> bool {
    user.is_admin() || project.owner_id == user.id
}

pub async fn create(
    repo: &dyn Repository,
    user: &User,
    input: ProjectInput,
) -> Result<Project, AppError> {
    input.validate()?;
    let project = repo.create_project(&Project::new(input, user.id)).await?;
    info!("user {} created project {}", user.id, project.id);
    Ok(project)
}

/// Own projects for regular users, all projects for admins.
pub async fn list(
    repo: &dyn Repository,
    user: &User,
    page: Pagination,
) -> Result<Vec<Project>, AppError> {
    page.validate()?;
    let owner = if user.is_admin() { None } else { Some(user.id) };
    repo.list_projects(owner, page).await
}

/// Fetches a project the user may access: `NotFound` if it does not exist,
/// `Forbidden` if it belongs to someone else.
pub async fn get(repo: &dyn Repository, user: &User, id: Uuid) -> Result<Project, AppError> {
    let project = repo
        .find_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if !can_access(user, &project) {
        warn!("user {} denied access to project {}", user.id, id);
        return Err(AppError::Forbidden(
            "Not authorized to access this project".into(),
        ));
    }
    Ok(project)
}

pub async fn update(
    repo: &dyn Repository,
    user: &User,
    id: Uuid,
    update: ProjectUpdate,
) -> Result<Project, AppError> {
    update.validate()?;
    let mut project = get(repo, user, id).await?;
    project
        .apply(update)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    repo.update_project(&project).await
}

/// Hard delete; the project's tasks are deleted with it.
pub async fn delete(repo: &dyn Repository, user: &User, id: Uuid) -> Result<(), AppError> {
    get(repo, user, id).await?;
    if !repo.delete_project(id).await? {
        return Err(AppError::NotFound("Project not found".into()));
    }
    info!("user {} deleted project {}", user.id, id);
    Ok(())
}
