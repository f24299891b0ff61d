use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::rate_limit::{RateLimitConfig, RateLimiter};

/// Application state containing shared resources.
///
/// Shared across workers via `web::Data`'s `Arc`, so the state itself never
/// needs to be cloned.
#[derive(Debug)]
pub struct AppState {
    /// Database connection (optional for test scenarios)
    pub db: Option<DatabaseConnection>,
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
    /// Process-wide rate-limit counters, shared across workers
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create a new AppState with the given database connection and configs
    pub fn new(
        db: DatabaseConnection,
        security: SecurityConfig,
        rate_limits: RateLimitConfig,
    ) -> Self {
        Self {
            db: Some(db),
            security,
            limiter: Arc::new(RateLimiter::new(rate_limits)),
        }
    }

    /// Create a new AppState without a database connection (for testing)
    pub fn without_db(security: SecurityConfig, rate_limits: RateLimitConfig) -> Self {
        Self {
            db: None,
            security,
            limiter: Arc::new(RateLimiter::new(rate_limits)),
        }
    }

    /// Database connection, or a 500-class error when running without one.
    pub fn require_db(&self) -> Result<&DatabaseConnection, crate::error::AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| crate::error::AppError::db_unavailable("Database unavailable".into()))
    }
}
