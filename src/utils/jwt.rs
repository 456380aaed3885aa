// src/utils/jwt.rs
//! Session token issuance and validation.
//!
//! Tokens are JWTs signed with HMAC-SHA-256 over the full claim set.
//! Nothing is persisted server-side: a token proves a prior successful
//! login purely through its signature and claims, checked on every
//! request with zero clock-skew allowance.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtSettings;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id, as a string.
    pub sub: String,

    /// The account's username at issuance time.
    pub name: String,

    /// Fresh random token identifier. Prevents replay-correlation across
    /// tokens issued to the same account.
    pub jti: String,

    /// Issued-at, Unix seconds.
    pub iat: i64,

    /// Expires-at, Unix seconds. The token is valid only while
    /// `now < exp`.
    pub exp: i64,

    /// Issuer string, must equal the configured value.
    pub iss: String,

    /// Audience string, must equal the configured value.
    pub aud: String,
}

/// A freshly signed token together with its expiry instant, so callers
/// can report the expiry without re-decoding the token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs a new session token for a verified account.
///
/// # Arguments
/// * `user_id` - Account id, embedded as the `sub` claim
/// * `username` - Account name, embedded as the `name` claim
/// * `settings` - Secret key, lifetime, issuer and audience
///
/// # Returns
/// The encoded token string and its expiry instant, or a signing error.
pub fn generate_token(
    user_id: i64,
    username: &str,
    settings: &JwtSettings,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::minutes(settings.expiration_minutes);

    let claims = Claims {
        sub: user_id.to_string(),
        name: username.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret_key.as_bytes()),
    )?;

    Ok(IssuedToken { token, expires_at })
}

/// Validates a bearer token and returns its claims.
///
/// Checks, in one pass: signature integrity, issuer equality, audience
/// equality and expiry, with `leeway = 0`. Any single failure rejects.
/// A token whose `exp` equals the current second is already outside the
/// validity window (`now < exp` is required).
pub fn validate_token(
    token: &str,
    settings: &JwtSettings,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&settings.issuer]);
    validation.set_audience(&[&settings.audience]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret_key.as_bytes()),
        &validation,
    )?;

    // The library treats exp == now as still valid; the validity window
    // here is half-open, so enforce the boundary explicitly.
    if data.claims.exp <= Utc::now().timestamp() {
        return Err(ErrorKind::ExpiredSignature.into());
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> JwtSettings {
        JwtSettings {
            secret_key: "unit-test-secret-key-0123456789".to_string(),
            expiration_minutes: 60,
            issuer: "dlv-system".to_string(),
            audience: "dlv-clients".to_string(),
        }
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let settings = test_settings();
        let issued = generate_token(42, "inspector", &settings).unwrap();

        let claims = validate_token(&issued.token, &settings).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name, "inspector");
        assert_eq!(claims.iss, "dlv-system");
        assert_eq!(claims.aud, "dlv-clients");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_token_ids_are_unique() {
        let settings = test_settings();
        let first = generate_token(1, "a", &settings).unwrap();
        let second = generate_token(1, "a", &settings).unwrap();

        let first_claims = validate_token(&first.token, &settings).unwrap();
        let second_claims = validate_token(&second.token, &settings).unwrap();
        assert_ne!(first_claims.jti, second_claims.jti);
    }

    #[test]
    fn test_zero_lifetime_token_is_already_invalid() {
        let mut settings = test_settings();
        settings.expiration_minutes = 0;

        let issued = generate_token(7, "inspector", &settings).unwrap();
        assert!(validate_token(&issued.token, &settings).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let settings = test_settings();
        let issued = generate_token(7, "inspector", &settings).unwrap();

        let mut other = test_settings();
        other.secret_key = "a-completely-different-secret".to_string();
        assert!(validate_token(&issued.token, &other).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let settings = test_settings();
        let issued = generate_token(7, "inspector", &settings).unwrap();

        let mut other = test_settings();
        other.issuer = "someone-else".to_string();
        assert!(validate_token(&issued.token, &other).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let settings = test_settings();
        let issued = generate_token(7, "inspector", &settings).unwrap();

        let mut other = test_settings();
        other.audience = "other-clients".to_string();
        assert!(validate_token(&issued.token, &other).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let settings = test_settings();
        assert!(validate_token("definitely.not.ajwt", &settings).is_err());
        assert!(validate_token("", &settings).is_err());
    }
}
