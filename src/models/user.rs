// src/models/user.rs
//! Account data model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An operator account able to log in and perform checks.
///
/// Accounts are created at provisioning time (seeding or an external
/// admin flow) and read by the credential verifier on every login.
///
/// # Security Considerations
/// `password_hash` is a PHC-format Argon2id string. The struct
/// deliberately does not implement `Serialize`, so the hash can never
/// leak into a response body; handlers project the fields they need.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Database identifier, also the `sub` claim of issued tokens.
    pub user_id: i64,

    /// Login name. Unique, matched case-sensitively.
    pub username: String,

    /// Salted adaptive-cost password hash (PHC string).
    pub password_hash: String,

    /// When the account was provisioned.
    pub created_date: DateTime<Utc>,
}
