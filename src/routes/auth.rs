use crate::{
    auth::{AuthenticatedUser, JwtKeys, LoginForm, RefreshRequest, RegisterRequest},
    db::Repository,
    error::AppError,
    models::UserResponse,
    services,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a regular user account. The password is stored as a bcrypt hash and
/// never returned.
///
/// ## Responses:
/// - `201 Created`: the new user.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid email, blank name or short password.
#[post("/register")]
pub async fn register(
    repo: web::Data<dyn Repository>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = services::auth::register(repo.get_ref(), register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Takes form-encoded `username` (the email) and `password` and returns an
/// access/refresh token pair.
///
/// ## Responses:
/// - `200 OK`: a `TokenResponse`.
/// - `400 Bad Request`: the account is inactive.
/// - `401 Unauthorized`: unknown email or wrong password.
#[post("/login")]
pub async fn login(
    repo: web::Data<dyn Repository>,
    keys: web::Data<JwtKeys>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    form.validate()?;
    let tokens =
        services::auth::login(repo.get_ref(), &keys, &form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// Refresh an access token
///
/// Exchanges a valid refresh token for a new access token. Access tokens are
/// rejected here with 401.
#[post("/refresh")]
pub async fn refresh(
    repo: web::Data<dyn Repository>,
    keys: web::Data<JwtKeys>,
    body: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;
    let tokens = services::auth::refresh(repo.get_ref(), &keys, &body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(tokens))
}

/// The user behind the access token.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(user.0)))
}
