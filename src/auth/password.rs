use crate::error::AppError;
use bcrypt::{hash, verify};

const BCRYPT_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Returns `Ok(false)` on mismatch. A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    match verify(password, hashed_password) {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_)) => Ok(false),
        Err(e) => Err(AppError::InternalServerError(format!(
            "Failed to verify password: {}",
            e
        ))),
    }
}
