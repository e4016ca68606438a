use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::auth::token::{JwtKeys, TokenType};
use crate::error::AppError;

/// Paths reachable without an access token.
const PUBLIC_PATHS: &[&str] = &["/", "/health", "/auth/register", "/auth/login", "/auth/refresh"];

fn is_public(path: &str) -> bool {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    PUBLIC_PATHS.contains(&path)
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Validates the bearer access token on every non-public path and stores the
/// decoded `Claims` in the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let verified = match (req.app_data::<web::Data<JwtKeys>>(), bearer_token(&req)) {
            (None, _) => Err(AppError::InternalServerError(
                "JWT keys are not configured".into(),
            )),
            (Some(_), None) => Err(AppError::Unauthorized("Missing token".into())),
            (Some(keys), Some(token)) => keys.verify(token, TokenType::Access),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                debug!("rejected request to {}: {}", req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/"));
        assert!(is_public("/health"));
        assert!(is_public("/auth/login"));
        assert!(is_public("/auth/login/"));
        assert!(is_public("/auth/refresh"));
        assert!(!is_public("/auth/me"));
        assert!(!is_public("/tasks"));
        assert!(!is_public("/reports/overdue"));
    }
}
