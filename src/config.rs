use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Optional administrator account created at startup when absent.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub server_port: u16,
    pub server_host: String,
    pub admin: Option<AdminBootstrap>,
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::InternalServerError(format!("{} must be set", name)))
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminBootstrap {
                email,
                password,
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 5)?,
            secret_key: required("SECRET_KEY")?,
            access_token_expire_minutes: parsed_or("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            refresh_token_expire_days: parsed_or("REFRESH_TOKEN_EXPIRE_DAYS", 7)?,
            server_port: parsed_or("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            admin,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
