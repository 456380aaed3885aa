// src/main.rs

//! # Driver License Verification System - Main Entry Point
//!
//! This module serves as the main entry point for the license
//! verification backend. It initializes all core components and starts
//! the API server.
//!
//! ## Architecture Overview
//! 1. **Storage Layer**: SQLite repositories for accounts, license
//!    records and the append-only audit trail
//! 2. **Services Layer**: Credential verification, token issuance,
//!    license registration and the verification state machine
//! 3. **API Layer**: Axum HTTP surface with a bearer-token gate
//!
//! ## Environment Variables Required
//! - `DATABASE_URL`: SQLite connection string
//! - `JWT_SECRET_KEY`: Symmetric token signing key
//! - `JWT_ISSUER` / `JWT_AUDIENCE`: Expected token claims
//! - `JWT_EXPIRATION_MINUTES`: (Optional) Token lifetime, default 60
//! - `BIND_ADDR`: (Optional) Listener address, default 127.0.0.1:3000
//! - `SEED_ADMIN_USERNAME` / `SEED_ADMIN_PASSWORD`: (Optional) first
//!   account, created only when the users table is empty

use crate::config::AppConfig;
use crate::services::api_server::ApiServer;
use crate::services::authentication::AuthenticationService;
use crate::services::driver::DriverService;
use crate::services::verification::VerificationService;
use crate::storage::driver_repository::DriverRepository;
use crate::storage::user_repository::UserRepository;
use crate::storage::verification_log_repository::VerificationLogRepository;
use dotenv::dotenv;
use log::info;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod config; // Environment configuration
mod error; // Error taxonomy
mod models; // Data structures
mod services; // Business logic and API
mod storage; // SQLite persistence layer
mod utils; // Password hashing and JWT helpers

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Open the database and bootstrap the schema
/// 3. Initialize repositories and service components
/// 4. Start API server
///
/// # Errors
/// Returns an error when required environment variables are missing or
/// the database cannot be opened; the process exits without serving.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;

    // Open the database and make sure the schema exists
    let pool = storage::connect(&config.database_url).await?;
    storage::init_schema(&pool).await?;

    // Repositories share the pool
    let user_repository = Arc::new(UserRepository::new(pool.clone()));
    let driver_repository = Arc::new(DriverRepository::new(pool.clone()));
    let verification_log_repository = Arc::new(VerificationLogRepository::new(pool));

    // Services
    let authentication = Arc::new(AuthenticationService::new(
        user_repository,
        config.jwt.clone(),
    ));
    let drivers = Arc::new(DriverService::new(driver_repository.clone()));
    let verification = Arc::new(VerificationService::new(
        driver_repository,
        verification_log_repository,
    ));

    // Provision the first account on an empty database, if configured
    if let Some(seed) = &config.seed_admin {
        authentication
            .ensure_seed_user(&seed.username, &seed.password)
            .await?;
    }

    let server = ApiServer::new(authentication, drivers, verification, config.jwt.clone());

    info!("listening on {}", config.bind_addr);
    server.run(config.bind_addr).await?;

    Ok(())
}
