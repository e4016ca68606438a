use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

const SERVICE_NAME: &str = "task-tracker-api";

/// Service banner
///
/// Names the service and points at the health endpoint.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Task Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health"
    }))
}

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": Utc::now()
    }))
}
