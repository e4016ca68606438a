use crate::error::AppError;
use crate::models::{User, UserRole};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Distinguishes short-lived access tokens from long-lived refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    pub email: String,
    pub role: UserRole,
    pub token_type: TokenType,
    /// Issued at (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Signing material and token lifetimes, shared through application data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            &config.secret_key,
            Duration::minutes(config.access_token_expire_minutes),
            Duration::days(config.refresh_token_expire_days),
        )
    }

    fn issue(&self, user: &User, token_type: TokenType, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token lifetime overflow".into()))?;

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            token_type,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenType::Access, self.access_ttl)
    }

    pub fn generate_refresh_token(&self, user: &User) -> Result<String, AppError> {
        self.issue(user, TokenType::Refresh, self.refresh_ttl)
    }

    /// Verifies signature and expiry, and that the token is of the expected kind.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature
    /// is invalid, it has expired, or it is the wrong kind of token.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;

        if claims.token_type != expected {
            return Err(AppError::Unauthorized("Invalid token type".into()));
        }
        Ok(claims)
    }
}
