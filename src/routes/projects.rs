use crate::{
    auth::AuthenticatedUser,
    db::Repository,
    error::AppError,
    models::{Pagination, ProjectInput, ProjectUpdate},
    services,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Creates a project owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new project.
/// - `422 Unprocessable Entity`: invalid name/description, or `end_date`
///   earlier than `start_date`.
#[post("")]
pub async fn create_project(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    input: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    let project = services::projects::create(repo.get_ref(), &user, input.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

/// Lists the caller's projects (every project for admins), newest first.
#[get("")]
pub async fn get_projects(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    page: web::Query<Pagination>,
) -> Result<impl Responder, AppError> {
    let projects = services::projects::list(repo.get_ref(), &user, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[get("/{id}")]
pub async fn get_project(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let project = services::projects::get(repo.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Partially updates a project; only the fields present in the body change.
#[put("/{id}")]
pub async fn update_project(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    update: web::Json<ProjectUpdate>,
) -> Result<impl Responder, AppError> {
    let project =
        services::projects::update(repo.get_ref(), &user, path.into_inner(), update.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project together with its tasks.
#[delete("/{id}")]
pub async fn delete_project(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    services::projects::delete(repo.get_ref(), &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
