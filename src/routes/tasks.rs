use crate::{
    auth::AuthenticatedUser,
    db::Repository,
    error::AppError,
    models::{Pagination, TaskFilter, TaskInput, TaskUpdate},
    services,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the tasks visible to the authenticated user.
///
/// Regular users see tasks they created, tasks assigned to them and tasks in
/// projects they own; admins see every task. Tasks are ordered by creation
/// date in descending order.
///
/// ## Query Parameters:
/// - `status` (optional): "pending", "in_progress" or "done".
/// - `priority` (optional): "low", "medium" or "high".
/// - `project_id`, `assignee_id` (optional): exact matches.
/// - `due_after`, `due_before` (optional): inclusive due date bounds (`YYYY-MM-DD`).
/// - `search` (optional): case-insensitive match on title and description.
/// - `skip`, `limit` (optional): pagination, `limit` at most 100.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: an unknown enum value or out-of-range pagination.
#[get("")]
pub async fn get_tasks(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    filter: web::Query<TaskFilter>,
    page: web::Query<Pagination>,
) -> Result<impl Responder, AppError> {
    let tasks = services::tasks::list(repo.get_ref(), &user, &filter, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// A JSON object matching `TaskInput`:
/// - `title`: required, 1 to 200 characters.
/// - `description` (optional): at most 1000 characters.
/// - `status` (optional): defaults to "pending".
/// - `priority` (optional): defaults to "medium".
/// - `due_date` (optional): `YYYY-MM-DD`.
/// - `assignee_id` (optional): defaults to the creator.
/// - `project_id` (optional): a project the caller can access.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `403 Forbidden`: the project belongs to someone else.
/// - `404 Not Found`: the project or assignee does not exist.
/// - `422 Unprocessable Entity`: validation failed.
#[post("")]
pub async fn create_task(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::create(repo.get_ref(), &user, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `403 Forbidden`: the task exists but is not visible to the caller.
/// - `404 Not Found`: no task with this ID.
#[get("/{id}")]
pub async fn get_task(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = services::tasks::get(repo.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Fields left out of the body keep their value; `null` clears the nullable
/// ones (`description`, `due_date`, `assignee_id`, `project_id`).
#[put("/{id}")]
pub async fn update_task(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task =
        services::tasks::update(repo.get_ref(), &user, path.into_inner(), task_data.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Responds `204 No Content`.
#[delete("/{id}")]
pub async fn delete_task(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    services::tasks::delete(repo.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
