#![allow(dead_code, unused_macros)]

use actix_web::body::{self, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;

use tasktracker::auth::{hash_password, JwtKeys};
use tasktracker::db::{MemoryRepository, Repository};
use tasktracker::models::{NewUser, User, UserRole};

pub const PASSWORD: &str = "testpassword123";

pub fn keys() -> JwtKeys {
    JwtKeys::new(
        "integration-test-secret",
        Duration::minutes(30),
        Duration::days(7),
    )
}

pub fn state() -> (Arc<MemoryRepository>, web::Data<dyn Repository>, web::Data<JwtKeys>) {
    let repo = Arc::new(MemoryRepository::new());
    let shared: Arc<dyn Repository> = repo.clone();
    (repo, web::Data::from(shared), web::Data::new(keys()))
}

/// Builds the full application (auth middleware included) over the given state.
macro_rules! init_app {
    ($repo:expr, $keys:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(tasktracker::auth::AuthMiddleware)
                .wrap(actix_web::middleware::Logger::default())
                .configure(tasktracker::configure($repo.clone(), $keys.clone())),
        )
        .await
    };
}

/// Inserts a user directly, with `PASSWORD` as the password.
pub async fn seed_user(repo: &MemoryRepository, email: &str, role: UserRole) -> User {
    repo.create_user(NewUser {
        email: email.to_string(),
        name: "Test User".to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        role,
    })
    .await
    .unwrap()
}

pub fn bearer(keys: &JwtKeys, user: &User) -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}", keys.generate_access_token(user).unwrap()),
    )
}

/// Sends a request and returns status plus JSON body (`Null` when empty).
/// Errors raised by middleware are rendered the way the server would.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, body::to_bytes(resp.into_body()).await.unwrap())
        }
    };
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
