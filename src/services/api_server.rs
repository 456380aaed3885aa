// src/services/api_server.rs
//! API Server for the Driver License Verification System
//!
//! This module provides the REST API interface for the license
//! verification engine, including operator login, license registration,
//! lookup and listing, authenticity verification, and the per-license
//! audit history.
//!
//! The API is built using Axum and includes endpoints for:
//! - Operator login and session-token issuance
//! - License record registration (authenticated)
//! - License lookup and listing (authenticated)
//! - License authenticity verification (authenticated)
//! - Verification audit history (authenticated)
//!
//! Every route except `/login` sits behind a bearer-token gate that
//! validates signature, issuer, audience and expiry with zero clock-skew
//! allowance before the engine is reached.

use crate::config::JwtSettings;
use crate::error::StorageError;
use crate::models::driver::{Driver, NewDriver};
use crate::models::verification::{VerificationLog, VerificationResult, VerificationStatus};
use crate::services::authentication::AuthenticationService;
use crate::services::driver::DriverService;
use crate::services::verification::VerificationService;
use crate::utils::jwt;
use axum::{
    extract::{Json, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// API request and response structures

/// Request payload for operator login
#[derive(Serialize, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Response containing the issued session token
#[derive(Serialize, Deserialize)]
struct LoginResponse {
    token: String,
    expires_at: DateTime<Utc>,
    user_id: i64,
    username: String,
}

/// Request payload for registering a license record
#[derive(Serialize, Deserialize)]
struct RegisterDriverRequest {
    license_id: String,
    full_name: String,
    date_of_birth: NaiveDate,
    license_type: String,
    expiry_date: NaiveDate,
    qr_raw_data: Option<String>,
    ocr_raw_text: Option<String>,
}

/// Response for license registration
#[derive(Serialize, Deserialize)]
struct RegisterDriverResponse {
    driver_id: i64,
    license_id: String,
}

/// Full license record view for direct lookups
#[derive(Serialize)]
struct DriverView {
    driver_id: i64,
    license_id: String,
    full_name: String,
    date_of_birth: NaiveDate,
    license_type: String,
    expiry_date: NaiveDate,
    qr_raw_data: Option<String>,
    ocr_raw_text: Option<String>,
    created_date: DateTime<Utc>,
    registered_by: i64,
}

/// Listing projection with a derived validity flag
#[derive(Serialize)]
struct DriverSummary {
    driver_id: i64,
    license_id: String,
    full_name: String,
    license_type: String,
    expiry_date: NaiveDate,
    created_date: DateTime<Utc>,
    /// "active" while the expiry date has not passed, "expired" after
    status: &'static str,
}

/// Request payload for verifying a scanned license
#[derive(Serialize, Deserialize)]
struct VerifyLicenseRequest {
    license_id: String,
    qr_raw_data: String,
}

/// Response for a verification call, including the derived projection
/// consumed by scanning clients
#[derive(Serialize)]
struct VerifyLicenseResponse {
    license_id: String,
    verification_status: VerificationStatus,
    driver_name: Option<String>,
    expiry_date: Option<NaiveDate>,
    checked_date: DateTime<Utc>,
    is_real: bool,
    is_active: bool,
    message: &'static str,
}

/// Generic error body; never carries internal detail
#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl From<Driver> for DriverView {
    fn from(driver: Driver) -> Self {
        DriverView {
            driver_id: driver.driver_id,
            license_id: driver.license_id,
            full_name: driver.full_name,
            date_of_birth: driver.date_of_birth,
            license_type: driver.license_type,
            expiry_date: driver.expiry_date,
            qr_raw_data: driver.qr_raw_data,
            ocr_raw_text: driver.ocr_raw_text,
            created_date: driver.created_date,
            registered_by: driver.registered_by,
        }
    }
}

impl From<Driver> for DriverSummary {
    fn from(driver: Driver) -> Self {
        let status = if driver.expiry_date < Utc::now().date_naive() {
            "expired"
        } else {
            "active"
        };
        DriverSummary {
            driver_id: driver.driver_id,
            license_id: driver.license_id,
            full_name: driver.full_name,
            license_type: driver.license_type,
            expiry_date: driver.expiry_date,
            created_date: driver.created_date,
            status,
        }
    }
}

impl From<VerificationResult> for VerifyLicenseResponse {
    fn from(result: VerificationResult) -> Self {
        VerifyLicenseResponse {
            license_id: result.license_id,
            verification_status: result.status,
            driver_name: result.driver_name,
            expiry_date: result.expiry_date,
            checked_date: result.checked_date,
            is_real: result.status.is_real(),
            is_active: result.status.is_active(),
            message: result.status.message(),
        }
    }
}

impl From<RegisterDriverRequest> for NewDriver {
    fn from(request: RegisterDriverRequest) -> Self {
        NewDriver {
            license_id: request.license_id,
            full_name: request.full_name,
            date_of_birth: request.date_of_birth,
            license_type: request.license_type,
            expiry_date: request.expiry_date,
            qr_raw_data: request.qr_raw_data,
            ocr_raw_text: request.ocr_raw_text,
        }
    }
}

/// The acting account extracted from a validated bearer token
struct TokenIdentity {
    user_id: i64,
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Service for credential validation and token issuance
    authentication: Arc<AuthenticationService>,

    /// Service for license registration and lookup
    drivers: Arc<DriverService>,

    /// Service for license authenticity verification
    verification: Arc<VerificationService>,

    /// Token validation settings for the bearer gate
    jwt_settings: JwtSettings,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `authentication` - Service for login and token issuance
    /// * `drivers` - Service for license registration and lookup
    /// * `verification` - Service for authenticity checks
    /// * `jwt_settings` - Settings the bearer gate validates against
    pub fn new(
        authentication: Arc<AuthenticationService>,
        drivers: Arc<DriverService>,
        verification: Arc<VerificationService>,
        jwt_settings: JwtSettings,
    ) -> Self {
        ApiServer {
            authentication,
            drivers,
            verification,
            jwt_settings,
        }
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        // Configure all API routes. The CORS policy is wide open because
        // the scanning client is a mobile app with no fixed origin.
        let app = Router::new()
            .route("/login", post(Self::login_handler))
            .route("/drivers", get(Self::list_drivers_handler))
            .route("/drivers/register", post(Self::register_driver_handler))
            .route("/drivers/verify", post(Self::verify_license_handler))
            .route("/drivers/:license_id", get(Self::get_driver_handler))
            .route(
                "/drivers/:license_id/history",
                get(Self::verification_history_handler),
            )
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(Arc::new(self.clone()));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await
    }

    /// Validates the bearer token on a protected request and extracts the
    /// acting account.
    ///
    /// Rejection is always a generic 401: the caller learns nothing about
    /// whether the token was missing, malformed, forged or expired.
    fn authorize(&self, headers: &HeaderMap) -> Result<TokenIdentity, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Err(unauthorized("Missing bearer token"));
        };

        let claims = jwt::validate_token(token, &self.jwt_settings).map_err(|e| {
            warn!("rejected bearer token: {e}");
            unauthorized("Invalid or expired token")
        })?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| unauthorized("Invalid user authentication"))?;

        Ok(TokenIdentity { user_id })
    }

    // =====================
    // Authentication Handlers
    // =====================

    /// Authenticates an operator and issues a session token
    ///
    /// # Endpoint
    /// POST /login
    ///
    /// # Responses
    /// - 200 OK: Token, expiry instant, account id and username
    /// - 401 Unauthorized: Generic rejection for bad credentials
    /// - 500 Internal Server Error: Persistence or signing fault
    async fn login_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<LoginRequest>,
    ) -> Response {
        info!("login attempt for username {}", payload.username);

        let user = match state
            .authentication
            .validate_credentials(&payload.username, &payload.password)
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("failed login attempt for username {}", payload.username);
                return unauthorized("Invalid username or password");
            }
            Err(e) => return internal_error("login", &e),
        };

        match state.authentication.generate_token(&user) {
            Ok(issued) => (
                StatusCode::OK,
                Json(LoginResponse {
                    token: issued.token,
                    expires_at: issued.expires_at,
                    user_id: user.user_id,
                    username: user.username,
                }),
            )
                .into_response(),
            Err(e) => {
                error!("token signing failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "An error occurred during login".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }

    // =====================
    // Driver Record Handlers
    // =====================

    /// Registers a new license record
    ///
    /// # Endpoint
    /// POST /drivers/register
    ///
    /// # Responses
    /// - 200 OK: Created driver id and license id
    /// - 401 Unauthorized: Missing or invalid bearer token
    /// - 409 Conflict: License id already registered
    /// - 500 Internal Server Error: Persistence fault
    async fn register_driver_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RegisterDriverRequest>,
    ) -> Response {
        let identity = match state.authorize(&headers) {
            Ok(identity) => identity,
            Err(response) => return response,
        };

        info!(
            "registration attempt for license {} by account {}",
            payload.license_id, identity.user_id
        );

        let license_id = payload.license_id.clone();
        match state
            .drivers
            .register_driver(payload.into(), identity.user_id)
            .await
        {
            Ok(driver) => (
                StatusCode::OK,
                Json(RegisterDriverResponse {
                    driver_id: driver.driver_id,
                    license_id: driver.license_id,
                }),
            )
                .into_response(),
            Err(StorageError::DuplicateLicense) => (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("License ID {license_id} already exists in the system"),
                }),
            )
                .into_response(),
            Err(e) => internal_error("driver registration", &e),
        }
    }

    /// Lists all registered license records, most recent first
    ///
    /// # Endpoint
    /// GET /drivers
    async fn list_drivers_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
    ) -> Response {
        if let Err(response) = state.authorize(&headers) {
            return response;
        }

        match state.drivers.get_all_drivers().await {
            Ok(drivers) => {
                let summaries: Vec<DriverSummary> =
                    drivers.into_iter().map(DriverSummary::from).collect();
                (StatusCode::OK, Json(summaries)).into_response()
            }
            Err(e) => internal_error("driver listing", &e),
        }
    }

    /// Fetches one license record by license id
    ///
    /// # Endpoint
    /// GET /drivers/:license_id
    ///
    /// # Responses
    /// - 200 OK: Full license record view
    /// - 404 Not Found: No record with that license id
    async fn get_driver_handler(
        State(state): State<Arc<ApiServer>>,
        Path(license_id): Path<String>,
        headers: HeaderMap,
    ) -> Response {
        if let Err(response) = state.authorize(&headers) {
            return response;
        }

        match state.drivers.get_driver_by_license_id(&license_id).await {
            Ok(Some(driver)) => (StatusCode::OK, Json(DriverView::from(driver))).into_response(),
            Ok(None) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("No driver found with license ID: {license_id}"),
                }),
            )
                .into_response(),
            Err(e) => internal_error("driver lookup", &e),
        }
    }

    // =====================
    // Verification Handlers
    // =====================

    /// Verifies a scanned license against the registry
    ///
    /// # Endpoint
    /// POST /drivers/verify
    ///
    /// # Responses
    /// - 200 OK: Classification result; `fake` and `expired` are
    ///   successful outcomes, never errors
    /// - 401 Unauthorized: Missing or invalid bearer token
    /// - 500 Internal Server Error: Persistence fault
    async fn verify_license_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<VerifyLicenseRequest>,
    ) -> Response {
        let identity = match state.authorize(&headers) {
            Ok(identity) => identity,
            Err(response) => return response,
        };

        match state
            .verification
            .verify_license(&payload.license_id, &payload.qr_raw_data, identity.user_id)
            .await
        {
            Ok(result) => {
                (StatusCode::OK, Json(VerifyLicenseResponse::from(result))).into_response()
            }
            Err(e) => internal_error("license verification", &e),
        }
    }

    /// Audit history for one license id, newest first
    ///
    /// # Endpoint
    /// GET /drivers/:license_id/history
    async fn verification_history_handler(
        State(state): State<Arc<ApiServer>>,
        Path(license_id): Path<String>,
        headers: HeaderMap,
    ) -> Response {
        if let Err(response) = state.authorize(&headers) {
            return response;
        }

        match state.verification.verification_history(&license_id).await {
            Ok(logs) => (StatusCode::OK, Json::<Vec<VerificationLog>>(logs)).into_response(),
            Err(e) => internal_error("verification history", &e),
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Logs the internal detail and answers with a generic 500. The detail
/// never reaches the response body.
fn internal_error(operation: &str, error: &StorageError) -> Response {
    error!("{operation} failed: {error}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "An unexpected error occurred".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_driver(expiry_date: NaiveDate) -> Driver {
        Driver {
            driver_id: 1,
            license_id: "DL-3001".to_string(),
            full_name: "Jane Driver".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            license_type: "B".to_string(),
            expiry_date,
            qr_raw_data: Some("QR-PAYLOAD".to_string()),
            ocr_raw_text: None,
            created_date: Utc::now(),
            registered_by: 1,
        }
    }

    #[test]
    fn test_listing_summary_derives_validity() {
        let future = (Utc::now() + Duration::days(30)).date_naive();
        let past = (Utc::now() - Duration::days(30)).date_naive();

        let active = DriverSummary::from(sample_driver(future));
        assert_eq!(active.status, "active");

        let expired = DriverSummary::from(sample_driver(past));
        assert_eq!(expired.status, "expired");

        // The expiry day itself still counts as active.
        let today = DriverSummary::from(sample_driver(Utc::now().date_naive()));
        assert_eq!(today.status, "active");
    }

    #[test]
    fn test_verification_response_projection() {
        let result = VerificationResult {
            license_id: "DL-3002".to_string(),
            status: VerificationStatus::Expired,
            driver_name: Some("Jane Driver".to_string()),
            expiry_date: Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            checked_date: Utc::now(),
        };

        let response = VerifyLicenseResponse::from(result);
        assert!(response.is_real);
        assert!(!response.is_active);
        assert_eq!(response.message, "This license has expired");
    }
}
