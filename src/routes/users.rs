use crate::{
    auth::{AdminUser, AuthenticatedUser},
    db::Repository,
    error::AppError,
    models::{Pagination, UserResponse, UserUpdate},
    services,
};
use actix_web::{get, put, web, HttpResponse, Responder};

/// The caller's own profile.
#[get("/me")]
pub async fn get_me(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(user.0)))
}

/// Updates the caller's name and/or email.
///
/// ## Responses:
/// - `200 OK`: the updated profile.
/// - `409 Conflict`: the new email belongs to another account.
/// - `422 Unprocessable Entity`: invalid email or blank name.
#[put("/me")]
pub async fn update_me(
    repo: web::Data<dyn Repository>,
    user: AuthenticatedUser,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    let user = services::users::update_profile(repo.get_ref(), &user, update.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Lists every account. Admin only.
#[get("")]
pub async fn list_users(
    repo: web::Data<dyn Repository>,
    _admin: AdminUser,
    page: web::Query<Pagination>,
) -> Result<impl Responder, AppError> {
    let users = services::users::list(repo.get_ref(), page.into_inner()).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// Fetches any account by id. Admin only.
#[get("/{id}")]
pub async fn get_user(
    repo: web::Data<dyn Repository>,
    _admin: AdminUser,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = services::users::get(repo.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
