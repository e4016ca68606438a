use crate::{
    auth::AdminUser, db::Repository, error::AppError, models::ReportScope, services,
};
use actix_web::{get, web, HttpResponse, Responder};

/// Task counts per status and the completion rate, optionally narrowed by
/// `project_id`, `due_after` and `due_before`. Admin only.
#[get("/completion")]
pub async fn completion(
    repo: web::Data<dyn Repository>,
    _admin: AdminUser,
    scope: web::Query<ReportScope>,
) -> Result<impl Responder, AppError> {
    let report = services::reports::completion(repo.get_ref(), &scope).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Tasks due before today that are not done. Admin only.
#[get("/overdue")]
pub async fn overdue(
    repo: web::Data<dyn Repository>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let tasks = services::reports::overdue(repo.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Project counts by activity. Admin only.
#[get("/projects")]
pub async fn projects(
    repo: web::Data<dyn Repository>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let stats = services::reports::project_stats(repo.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
