// src/services/authentication.rs
//! Credential verification and session-token issuance.
//!
//! The service owns the login decision: it looks up the account, checks
//! the password against its stored Argon2id hash and, for a verified
//! identity, mints a signed time-bounded token. Bad credentials are a
//! value (`None`), never an error, and the caller is told nothing about
//! which half of the pair was wrong.

use std::sync::Arc;

use log::{debug, info};

use crate::config::JwtSettings;
use crate::error::StorageError;
use crate::models::user::User;
use crate::storage::user_repository::UserRepository;
use crate::utils::jwt::{self, IssuedToken};
use crate::utils::password;

/// Service for validating login credentials and issuing session tokens.
pub struct AuthenticationService {
    /// Account lookup and provisioning
    user_repository: Arc<UserRepository>,

    /// Token signing configuration, shared with the bearer gate
    jwt_settings: JwtSettings,
}

impl AuthenticationService {
    /// Creates a new AuthenticationService instance.
    ///
    /// # Arguments
    /// * `user_repository` - Shared account repository
    /// * `jwt_settings` - Secret key, lifetime, issuer and audience for
    ///   issued tokens
    pub fn new(user_repository: Arc<UserRepository>, jwt_settings: JwtSettings) -> Self {
        AuthenticationService {
            user_repository,
            jwt_settings,
        }
    }

    /// Checks a username/password pair against the account store.
    ///
    /// The username lookup is case-sensitive, matching the stored value
    /// exactly. Returns `Ok(None)` both for an unknown username and for a
    /// wrong password, so callers cannot distinguish the two.
    ///
    /// # Errors
    /// Only persistence faults; a failed login is not an error.
    pub async fn validate_credentials(
        &self,
        username: &str,
        plaintext: &str,
    ) -> Result<Option<User>, StorageError> {
        let Some(user) = self.user_repository.get_by_username(username).await? else {
            debug!("login rejected: unknown username");
            return Ok(None);
        };

        if !password::verify_password(plaintext, &user.password_hash) {
            debug!("login rejected for {username}: password mismatch");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Issues a signed session token for a verified account.
    pub fn generate_token(&self, user: &User) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        jwt::generate_token(user.user_id, &user.username, &self.jwt_settings)
    }

    /// Provisions a new account with a freshly hashed password.
    ///
    /// Account creation is an administrative flow, not part of the
    /// verification engine; this is used by startup seeding and tests.
    pub async fn create_user(&self, username: &str, plaintext: &str) -> anyhow::Result<User> {
        let password_hash = password::hash_password(plaintext)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;

        Ok(self.user_repository.create(username, &password_hash).await?)
    }

    /// Creates the configured seed account when no account exists yet.
    ///
    /// Does nothing on a database that already has users, so a restart
    /// never duplicates or resets the seed.
    pub async fn ensure_seed_user(&self, username: &str, plaintext: &str) -> anyhow::Result<()> {
        if self.user_repository.count().await? > 0 {
            return Ok(());
        }

        let user = self.create_user(username, plaintext).await?;
        info!("seeded initial account {}", user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret_key: "auth-service-test-secret".to_string(),
            expiration_minutes: 30,
            issuer: "dlv-system".to_string(),
            audience: "dlv-clients".to_string(),
        }
    }

    async fn setup() -> AuthenticationService {
        let pool = storage::test_pool().await;
        AuthenticationService::new(Arc::new(UserRepository::new(pool)), test_settings())
    }

    #[tokio::test]
    async fn test_validate_credentials_success() {
        let service = setup().await;
        service.create_user("inspector", "s3cret").await.unwrap();

        let user = service
            .validate_credentials("inspector", "s3cret")
            .await
            .unwrap();
        assert_eq!(user.unwrap().username, "inspector");
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let service = setup().await;
        service.create_user("inspector", "s3cret").await.unwrap();

        let user = service
            .validate_credentials("inspector", "wrong")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_unknown_username_rejected() {
        let service = setup().await;

        let user = service
            .validate_credentials("nobody", "anything")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_username_match_is_case_sensitive() {
        let service = setup().await;
        service.create_user("Inspector", "s3cret").await.unwrap();

        // No normalization on lookup
        let user = service
            .validate_credentials("inspector", "s3cret")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_issued_token_validates_against_same_settings() {
        let service = setup().await;
        let user = service.create_user("inspector", "s3cret").await.unwrap();

        let issued = service.generate_token(&user).unwrap();
        let claims = crate::utils::jwt::validate_token(&issued.token, &test_settings()).unwrap();
        assert_eq!(claims.sub, user.user_id.to_string());
        assert_eq!(claims.name, "inspector");
    }

    #[tokio::test]
    async fn test_seed_user_created_only_once() {
        let service = setup().await;

        service.ensure_seed_user("admin", "changeme").await.unwrap();
        // Second call must not fail or duplicate
        service.ensure_seed_user("admin", "changeme").await.unwrap();

        let user = service
            .validate_credentials("admin", "changeme")
            .await
            .unwrap();
        assert!(user.is_some());
    }
}
