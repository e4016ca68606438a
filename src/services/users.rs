use validator::Validate;

use super::normalize_email;
use crate::db::Repository;
use crate::error::AppError;
use crate::models::{Pagination, User, UserUpdate};

/// Updates the caller's own profile. A taken email fails with `Conflict`.
pub async fn update_profile(
    repo: &dyn Repository,
    current: &User,
    mut update: UserUpdate,
) -> Result<User, AppError> {
    update.validate()?;
    update.email = update.email.as_deref().map(normalize_email);
    update.name = update.name.map(|name| name.trim().to_string());

    let mut user = current.clone();
    user.apply(update);
    repo.update_user(&user).await
}

pub async fn list(repo: &dyn Repository, page: Pagination) -> Result<Vec<User>, AppError> {
    page.validate()?;
    repo.list_users(page).await
}

pub async fn get(repo: &dyn Repository, id: i32) -> Result<User, AppError> {
    repo.find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
