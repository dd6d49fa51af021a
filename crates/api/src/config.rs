//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the scheduler API
//! server. It retrieves configuration values from environment variables and
//! provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Connection pool size (default: 5)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `SESSION_TTL_HOURS`: Lifetime of a login session, 1 to 87600 (default: 336, two weeks)
//! - `SESSION_COOKIE_SECURE`: Mark session cookies `Secure` (default: false)
//! - `ALLOCATION_MAX_RETRIES`: Retries after a serialization conflict; 0 disables them (default: 5)

use eyre::{eyre, Result, WrapErr};
use std::env;
use tracing::Level;

/// Upper bound for `SESSION_TTL_HOURS`, ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Configuration for the scheduler API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    pub database_max_connections: u32,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub session_ttl_hours: i64,

    pub secure_cookies: bool,

    pub allocation_max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: String::new(),
            database_max_connections: 5,
            log_level: Level::INFO,
            cors_origins: None,
            request_timeout: 30,
            session_ttl_hours: 24 * 14,
            secure_cookies: false,
            allocation_max_retries: 5,
        }
    }
}

fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn parse_session_ttl_hours(value: &str) -> Result<i64> {
    let hours: i64 = value.trim().parse().wrap_err("Invalid SESSION_TTL_HOURS value")?;
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(eyre!(
            "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
        ));
    }
    Ok(hours)
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - API_PORT, DATABASE_MAX_CONNECTIONS, SESSION_TTL_HOURS or
    ///   ALLOCATION_MAX_RETRIES is set but not a number
    /// - SESSION_TTL_HOURS is outside 1..=MAX_SESSION_TTL_HOURS
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Network settings
        let host = env::var("API_HOST").unwrap_or(defaults.host);
        let port = match env::var("API_PORT") {
            Ok(port) => port.parse().wrap_err("Invalid API_PORT value")?,
            Err(_) => defaults.port,
        };

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;
        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .wrap_err("Invalid DATABASE_MAX_CONNECTIONS value")?,
            Err(_) => defaults.database_max_connections,
        };

        // Logging settings
        let log_level = env::var("LOG_LEVEL")
            .map(|level| parse_log_level(&level))
            .unwrap_or(defaults.log_level);

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.request_timeout);

        // Session settings
        let session_ttl_hours = match env::var("SESSION_TTL_HOURS") {
            Ok(value) => parse_session_ttl_hours(&value)?,
            Err(_) => defaults.session_ttl_hours,
        };
        let secure_cookies = env::var("SESSION_COOKIE_SECURE")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.secure_cookies);

        let allocation_max_retries = match env::var("ALLOCATION_MAX_RETRIES") {
            Ok(value) => value
                .parse()
                .wrap_err("Invalid ALLOCATION_MAX_RETRIES value")?,
            Err(_) => defaults.allocation_max_retries,
        };

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            session_ttl_hours,
            secure_cookies,
            allocation_max_retries,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Session lifetime, clamped to the accepted range.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_fall_back_to_info() {
        assert_eq!(parse_log_level("debug"), Level::DEBUG);
        assert_eq!(parse_log_level("warn"), Level::WARN);
        assert_eq!(parse_log_level("verbose"), Level::INFO);
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl(), chrono::Duration::hours(336));
    }

    #[test]
    fn session_ttl_must_be_in_range() {
        assert_eq!(parse_session_ttl_hours("48").unwrap(), 48);
        assert!(parse_session_ttl_hours("0").is_err());
        assert!(parse_session_ttl_hours("-3").is_err());
        assert!(parse_session_ttl_hours("87601").is_err());
        assert!(parse_session_ttl_hours(&i64::MAX.to_string()).is_err());
        assert!(parse_session_ttl_hours("a week").is_err());
    }

    #[test]
    fn out_of_range_ttl_field_is_clamped() {
        let config = ApiConfig {
            session_ttl_hours: i64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.session_ttl(),
            chrono::Duration::hours(MAX_SESSION_TTL_HOURS)
        );
    }
}
