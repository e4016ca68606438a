#![doc = "The `tasktracker` library crate."]
#![doc = ""]
#![doc = "Domain models, storage, authentication, business rules and routing for the"]
#![doc = "task tracker API. The binary (`main.rs`) wires them to Postgres and runs the"]
#![doc = "HTTP server; the integration tests wire them to `MemoryRepository`."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use actix_web::web;

use crate::auth::JwtKeys;
use crate::db::Repository;
use crate::error::{form_error_handler, json_error_handler, path_error_handler, query_error_handler};

/// Registers shared state, extractor error handlers and every route.
///
/// Middleware is left to the caller:
///
/// ```ignore
/// App::new()
///     .wrap(AuthMiddleware)
///     .wrap(Cors::default())
///     .wrap(Logger::default())
///     .configure(tasktracker::configure(repo.clone(), keys.clone()))
/// ```
pub fn configure(
    repo: web::Data<dyn Repository>,
    keys: web::Data<JwtKeys>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(repo)
            .app_data(keys)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::FormConfig::default().error_handler(form_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .configure(routes::config);
    }
}
