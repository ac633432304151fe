// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The session signing secret and the database URL are required; everything
//! else has a development default.

use std::env;
use std::time::Duration;

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Upstream calls are aborted after this long unless overridden.
pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 15;

/// Cached gists are considered fresh for this long unless overridden.
pub const DEFAULT_GIST_CACHE_TTL_SECS: u64 = 5 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// sqlx connection string for the account store
    pub database_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Production mode marks the session cookie `Secure`
    pub is_production: bool,
    /// GitHub REST API base URL (overridable for tests and GHE)
    pub github_api_url: String,
    /// Upper bound for a single GitHub API call
    pub github_timeout: Duration,
    /// Freshness window for cached gists
    pub gist_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();

        let database_url = env::var("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            database_url,
            jwt_signing_key,
            is_production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            github_api_url: env::var("GITHUB_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string()),
            github_timeout: Duration::from_secs(parse_or(
                "GITHUB_TIMEOUT_SECS",
                DEFAULT_GITHUB_TIMEOUT_SECS,
            )?),
            gist_cache_ttl: Duration::from_secs(parse_or(
                "GIST_CACHE_TTL_SECS",
                DEFAULT_GIST_CACHE_TTL_SECS,
            )?),
        })
    }

    /// Config for tests: in-memory database, non-production cookies.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            is_production: false,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_timeout: Duration::from_secs(DEFAULT_GITHUB_TIMEOUT_SECS),
            gist_cache_ttl: Duration::from_secs(DEFAULT_GIST_CACHE_TTL_SECS),
        }
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
