// src/error.rs
//! Error taxonomy for the license verification system.
//!
//! Expected business outcomes (bad credentials, missing license, QR
//! mismatch, expiry) are modeled as plain return values and never appear
//! here. The variants below cover the remaining failure modes: duplicate
//! unique keys on creation, infrastructure faults in the persistence
//! layer, and invalid startup configuration.

use thiserror::Error;

/// Failures surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row with the same license id already exists. Mapped from the
    /// SQLite unique-constraint violation on `drivers.license_id`, which
    /// is the authoritative enforcement; the application-side existence
    /// pre-check is only a fast path.
    #[error("license id already registered")]
    DuplicateLicense,

    /// Any other database fault. Not retried; callers surface a generic
    /// failure and log the detail.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for environment variable {name}: {message}")]
    InvalidVar {
        name: &'static str,
        message: String,
    },
}
