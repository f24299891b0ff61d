use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Token lifetime used when none is configured: 30 days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Access-token lifetime. Expiry is fixed at issuance; tokens are never
    /// refreshed or revoked server-side.
    pub token_ttl: Duration,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret and default TTL.
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Read the secret and optional TTL override from the environment.
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        let secret = std::env::var("BACKEND_JWT_SECRET")
            .map_err(|_| crate::error::AppError::config("BACKEND_JWT_SECRET must be set".into()))?;

        let mut config = Self::new(secret.into_bytes());
        if let Ok(raw) = std::env::var("TOKEN_TTL_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                crate::error::AppError::config("TOKEN_TTL_SECS must be an integer".into())
            })?;
            config.token_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
