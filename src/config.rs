use std::env;

use crate::error::AppError;

const DEFAULT_DATABASE_NAME: &str = "ride_hailing";

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    /// `None` starts the service with a detached store.
    pub database_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("PORT", 8000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            database_name: database_name(env::var("DATABASE_NAME").ok()),
        })
    }
}

fn database_name(raw: Option<String>) -> Option<String> {
    match raw {
        Some(name) if name.trim().is_empty() => None,
        Some(name) => Some(name.trim().to_string()),
        None => Some(DEFAULT_DATABASE_NAME.to_string()),
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
