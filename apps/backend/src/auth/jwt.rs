use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Claims included in our backend-issued access tokens.
///
/// The tier flags are a snapshot taken at issuance. Past signature and
/// subject verification they are informational only: every permission
/// decision reads the live user record instead (see the principal resolver).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user id, as a decimal string
    pub sub: String,
    pub is_admin: bool,
    pub is_business: bool,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch), fixed at issuance
    pub exp: i64,
}

/// Mint a signed access token for the given user.
///
/// Expiry is `now + security.token_ttl` (30 days by default) and is never
/// extended; there is no refresh path and no server-side revocation.
pub fn mint_access_token(
    user_id: i64,
    is_admin: bool,
    is_business: bool,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time".to_string()))?
        .as_secs() as i64;

    let exp = iat + security.token_ttl.as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        is_business,
        iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a token and return its claims.
///
/// Every failure mode (expired, bad signature, malformed) maps to the same
/// opaque 401 so callers cannot probe token validity; the specific reason is
/// logged server-side.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    // Pin the algorithm and disable the default 60s leeway: a token is
    // invalid the moment `now >= exp`, with no grace window.
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                warn!(reason = "token_expired", "rejected access token");
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                warn!(reason = "invalid_signature", "rejected access token");
            }
            _ => {
                warn!(reason = "invalid_token", "rejected access token");
            }
        }
        AppError::unauthorized()
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{mint_access_token, verify_access_token};
    use crate::state::security_config::SecurityConfig;
    use crate::AppError;

    fn test_security() -> SecurityConfig {
        SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes())
    }

    #[test]
    fn mint_and_verify_roundtrip() {
        let security = test_security();
        let now = SystemTime::now();

        let token = mint_access_token(42, false, true, now, &security).unwrap();
        let claims = verify_access_token(&token, &security).unwrap();

        assert_eq!(claims.sub, "42");
        assert!(!claims.is_admin);
        assert!(claims.is_business);
        assert_eq!(
            claims.iat,
            now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
        );
        assert_eq!(claims.exp, claims.iat + 30 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = test_security().with_token_ttl(Duration::from_secs(10 * 60));

        // Issued 20 minutes ago with a 10-minute TTL.
        let now = SystemTime::now() - Duration::from_secs(20 * 60);
        let token = mint_access_token(1, false, false, now, &security).unwrap();

        assert!(matches!(
            verify_access_token(&token, &security),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expiry_has_no_grace_window() {
        let security = test_security().with_token_ttl(Duration::from_secs(60));

        // Expired 30 seconds ago: close enough that a default jsonwebtoken
        // leeway would still accept it.
        let now = SystemTime::now() - Duration::from_secs(90);
        let token = mint_access_token(1, false, false, now, &security).unwrap();

        assert!(matches!(
            verify_access_token(&token, &security),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn bad_signature_is_rejected() {
        let security_a = SecurityConfig::new("secret-A".as_bytes());
        let security_b = SecurityConfig::new("secret-B".as_bytes());

        let token = mint_access_token(7, true, false, SystemTime::now(), &security_a).unwrap();

        assert!(matches!(
            verify_access_token(&token, &security_b),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let security = test_security();
        assert!(matches!(
            verify_access_token("not.a.jwt", &security),
            Err(AppError::Unauthorized)
        ));
    }
}
