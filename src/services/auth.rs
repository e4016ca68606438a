use log::{info, warn};
use validator::Validate;

use super::normalize_email;
use crate::auth::{
    hash_password, verify_password, JwtKeys, RegisterRequest, TokenResponse, TokenType,
};
use crate::config::AdminBootstrap;
use crate::db::Repository;
use crate::error::AppError;
use crate::models::{NewUser, User, UserRole};

/// Creates a regular user. Fails with `Conflict` when the email is registered.
pub async fn register(repo: &dyn Repository, request: RegisterRequest) -> Result<User, AppError> {
    request.validate()?;
    let email = normalize_email(&request.email);

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = repo
        .create_user(NewUser {
            email,
            name: request.name.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            role: UserRole::User,
        })
        .await?;
    info!("registered user {}", user.id);
    Ok(user)
}

/// Checks the credentials and issues an access/refresh token pair.
pub async fn login(
    repo: &dyn Repository,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<TokenResponse, AppError> {
    let invalid = || AppError::Unauthorized("Incorrect email or password".into());

    let user = match repo.find_user_by_email(&normalize_email(email)).await? {
        Some(user) => user,
        None => {
            warn!("login attempt for unknown email");
            return Err(invalid());
        }
    };
    if !verify_password(password, &user.password_hash)? {
        warn!("failed login for user {}", user.id);
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::BadRequest("Inactive user".into()));
    }

    info!("user {} logged in", user.id);
    Ok(TokenResponse::bearer(
        keys.generate_access_token(&user)?,
        keys.generate_refresh_token(&user)?,
    ))
}

/// Issues a new access token for a valid refresh token. The refresh token
/// itself is returned unchanged.
pub async fn refresh(
    repo: &dyn Repository,
    keys: &JwtKeys,
    refresh_token: &str,
) -> Result<TokenResponse, AppError> {
    let claims = keys
        .verify(refresh_token, TokenType::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    let user = repo
        .find_user_by_id(claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    Ok(TokenResponse::bearer(
        keys.generate_access_token(&user)?,
        refresh_token.to_string(),
    ))
}

/// Creates the configured administrator unless the email already exists.
/// Returns the new user when one was created.
pub async fn ensure_admin(
    repo: &dyn Repository,
    admin: &AdminBootstrap,
) -> Result<Option<User>, AppError> {
    let email = normalize_email(&admin.email);
    if repo.find_user_by_email(&email).await?.is_some() {
        return Ok(None);
    }

    let user = repo
        .create_user(NewUser {
            email,
            name: admin.name.clone(),
            password_hash: hash_password(&admin.password)?,
            role: UserRole::Admin,
        })
        .await?;
    info!("bootstrapped admin user {}", user.id);
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use chrono::Duration;

    fn keys() -> JwtKeys {
        JwtKeys::new("service-test-secret", Duration::minutes(30), Duration::days(7))
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "Test User".to_string(),
            password: "testpassword123".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_register_twice_conflicts() {
        let repo = MemoryRepository::new();
        let user = register(&repo, request("Test@Example.com")).await.unwrap();
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, UserRole::User);

        let second = register(&repo, request("test@example.com")).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[actix_rt::test]
    async fn test_login_and_refresh() {
        let repo = MemoryRepository::new();
        let keys = keys();
        register(&repo, request("test@example.com")).await.unwrap();

        let wrong = login(&repo, &keys, "test@example.com", "nope").await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
        let unknown = login(&repo, &keys, "ghost@example.com", "testpassword123").await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));

        let tokens = login(&repo, &keys, "TEST@example.com", "testpassword123")
            .await
            .unwrap();
        assert_eq!(tokens.token_type, "bearer");

        let refreshed = refresh(&repo, &keys, &tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.refresh_token, tokens.refresh_token);
        assert!(keys.verify(&refreshed.access_token, TokenType::Access).is_ok());

        let misuse = refresh(&repo, &keys, &tokens.access_token).await;
        assert!(matches!(misuse, Err(AppError::Unauthorized(_))));
    }

    #[actix_rt::test]
    async fn test_ensure_admin_is_idempotent() {
        let repo = MemoryRepository::new();
        let bootstrap = AdminBootstrap {
            email: "root@example.com".to_string(),
            password: "rootpassword".to_string(),
            name: "Root".to_string(),
        };

        let created = ensure_admin(&repo, &bootstrap).await.unwrap().unwrap();
        assert!(created.is_admin());
        assert!(ensure_admin(&repo, &bootstrap).await.unwrap().is_none());
    }
}
