// src/config.rs
//! Environment-driven configuration.
//!
//! All settings are read from the process environment (a `.env` file is
//! loaded by `main` before this module runs). Validation happens once at
//! startup; a missing or malformed variable aborts the process with a
//! `ConfigError` instead of failing later mid-request.

use std::env;
use std::net::SocketAddr;

use crate::error::ConfigError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_EXPIRATION_MINUTES: i64 = 60;

/// Settings for issuing and validating session tokens.
///
/// The same values are used on both sides: the issuer signs with
/// `secret_key` and stamps `issuer`/`audience` into the claims, and the
/// bearer gate rejects any token whose signature, issuer or audience does
/// not match exactly.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    /// Symmetric HMAC signing key. Never logged.
    pub secret_key: String,

    /// Token lifetime in minutes from the moment of issuance.
    pub expiration_minutes: i64,

    /// Expected `iss` claim value.
    pub issuer: String,

    /// Expected `aud` claim value.
    pub audience: String,
}

/// Optional first-account provisioning, applied only when the users table
/// is empty at startup.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

/// Fully validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. `sqlite://dlv.db?mode=rwc`.
    pub database_url: String,

    /// Socket address for the HTTP listener.
    pub bind_addr: SocketAddr,

    pub jwt: JwtSettings,

    pub seed_admin: Option<SeedAdmin>,
}

impl AppConfig {
    /// Reads and validates the full configuration from the environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is absent or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_var("DATABASE_URL")?;

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidVar {
                name: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let expiration_minutes = match env::var("JWT_EXPIRATION_MINUTES") {
            Ok(raw) => raw.parse::<i64>().map_err(|e| ConfigError::InvalidVar {
                name: "JWT_EXPIRATION_MINUTES",
                message: e.to_string(),
            })?,
            Err(_) => DEFAULT_EXPIRATION_MINUTES,
        };

        let jwt = JwtSettings {
            secret_key: require_var("JWT_SECRET_KEY")?,
            expiration_minutes,
            issuer: require_var("JWT_ISSUER")?,
            audience: require_var("JWT_AUDIENCE")?,
        };

        // Both seed variables must be present for seeding to happen.
        let seed_admin = match (
            env::var("SEED_ADMIN_USERNAME"),
            env::var("SEED_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some(SeedAdmin { username, password }),
            _ => None,
        };

        Ok(AppConfig {
            database_url,
            bind_addr,
            jwt,
            seed_admin,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
