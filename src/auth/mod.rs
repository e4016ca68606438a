pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::NAME_REGEX;

// Re-export necessary items
pub use extractors::{AdminUser, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, JwtKeys, TokenType};

/// Payload for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// Display name, 1 to 100 characters and not blank.
    #[validate(
        length(min = 1, max = 100),
        regex(path = "NAME_REGEX", message = "Name must not be blank")
    )]
    pub name: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

/// Form-encoded credentials for `POST /auth/login`, OAuth2 password-flow style:
/// the email travels in the `username` field.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_form_validation() {
        let valid_login = LoginForm {
            username: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_password = LoginForm {
            username: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "testexample.com".to_string(),
            name: "Test User".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let blank_name = RegisterRequest {
            email: "test@example.com".to_string(),
            name: "   ".to_string(),
            password: "password123".to_string(),
        };
        assert!(blank_name.validate().is_err());

        let short_password = RegisterRequest {
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_token_response_shape() {
        let json = serde_json::to_value(TokenResponse::bearer("a".into(), "r".into())).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
    }
}
