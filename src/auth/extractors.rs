use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use log::warn;
use std::ops::Deref;

use crate::auth::token::Claims;
use crate::db::Repository;
use crate::error::AppError;
use crate::models::User;

/// The user behind a verified access token, freshly loaded from storage.
///
/// Requires `AuthMiddleware` to have stored the token's `Claims` in the request
/// extensions. Fails with 401 when the claims are missing or the user no longer
/// exists, and with 400 when the account is inactive.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl AuthenticatedUser {
    async fn resolve(
        claims: Option<Claims>,
        repo: Option<web::Data<dyn Repository>>,
    ) -> Result<Self, AppError> {
        let claims = claims
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))?;
        let repo = repo
            .ok_or_else(|| AppError::InternalServerError("Repository is not configured".into()))?;

        let user = repo
            .find_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))?;

        if !user.is_active {
            return Err(AppError::BadRequest("Inactive user".into()));
        }
        Ok(AuthenticatedUser(user))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let repo = req.app_data::<web::Data<dyn Repository>>().cloned();
        Box::pin(async move { Self::resolve(claims, repo).await.map_err(Into::into) })
    }
}

/// An `AuthenticatedUser` whose role is admin; anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let authenticated = AuthenticatedUser::from_request(req, payload);
        Box::pin(async move {
            let AuthenticatedUser(user) = authenticated.await?;
            if !user.is_admin() {
                warn!("user {} denied admin access", user.id);
                return Err(AppError::Forbidden("Admin access required".into()).into());
            }
            Ok(AdminUser(user))
        })
    }
}
