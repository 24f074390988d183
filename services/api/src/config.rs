//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;
use wandau_core::DEFAULT_FEATURED_LIMIT;

/// Name of the cookie that carries the session token.
pub const AUTH_COOKIE: &str = "authToken";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Whether the service runs behind HTTPS for a cross-site frontend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    Development,
    Production,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub token_secret: String,
    pub token_ttl: chrono::Duration,
    pub mode: DeploymentMode,
    pub cors_origins: Vec<String>,
    pub featured_limit: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server ---
        let port = parse_or("PORT", &lookup, 5000u16)?;
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], port)),
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Database ---
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 5u32)?;

        // --- Session tokens ---
        let token_secret = lookup("ACCESS_TOKEN_SECRET")
            .ok_or_else(|| ConfigError::MissingVar("ACCESS_TOKEN_SECRET".to_string()))?;
        if token_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ACCESS_TOKEN_SECRET".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let ttl_secs = parse_or("TOKEN_TTL_SECS", &lookup, 5 * 60 * 60i64)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TTL_SECS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let mode = match lookup("APP_ENV").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("development") | Some("dev") => DeploymentMode::Development,
            Some("production") | Some("prod") => DeploymentMode::Production,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "APP_ENV".to_string(),
                    format!("'{}' is neither 'development' nor 'production'", other),
                ))
            }
        };

        // --- Cross-origin frontends ---
        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        // Session cookies are sent with credentials, which browsers never
        // allow together with a wildcard origin.
        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::InvalidValue(
                "CORS_ORIGINS".to_string(),
                "'*' cannot be used with credentialed requests; list the origins".to_string(),
            ));
        }

        let featured_limit = parse_or("FEATURED_LIMIT", &lookup, DEFAULT_FEATURED_LIMIT)?;

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            token_secret,
            token_ttl: chrono::Duration::seconds(ttl_secs),
            mode,
            cors_origins,
            featured_limit,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
