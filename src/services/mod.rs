//! Business rules between the HTTP handlers and the repository: input
//! validation, ownership and role checks, and the mapping of missing or
//! foreign resources to `NotFound` / `Forbidden`.

pub mod auth;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod users;

/// Emails are compared and stored in lowercase.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
