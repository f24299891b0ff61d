//! Account lifecycle: registration, login, tier changes, deletion.

use std::time::SystemTime;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_regex::regex_is_match;
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::auth::jwt::mint_access_token;
use crate::auth::principal::Principal;
use crate::entities::users;
use crate::error::AppError;
use crate::repos;
use crate::state::security_config::SecurityConfig;

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_business: bool,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", email) {
        Ok(())
    } else {
        Err(AppError::invalid(
            "INVALID_EMAIL",
            "Email address is not valid".to_string(),
        ))
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Create an account. Email is normalized to lowercase and must be unused.
pub async fn register(
    conn: &(impl ConnectionTrait + Send + Sync),
    input: RegisterInput,
) -> Result<users::Model, AppError> {
    let first_name = input.first_name.trim();
    let last_name = input.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::invalid(
            "INVALID_NAME",
            "First and last name are required".to_string(),
        ));
    }

    let email = input.email.trim().to_lowercase();
    validate_email(&email)?;

    if input.password.len() < 8 {
        return Err(AppError::invalid(
            "INVALID_PASSWORD",
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if repos::users::find_user_by_email(conn, &email).await?.is_some() {
        return Err(AppError::conflict(
            "EMAIL_TAKEN",
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&input.password)?;
    let user = repos::users::create_user(
        conn,
        first_name,
        last_name,
        &email,
        &password_hash,
        input.is_business,
    )
    .await?;

    info!(user_id = user.id, "account created");
    Ok(user)
}

/// Verify credentials and mint a 30-day access token.
///
/// Unknown email and wrong password are deliberately indistinguishable: both
/// produce the same opaque 401 with only a server-side log telling them
/// apart.
pub async fn login(
    conn: &(impl ConnectionTrait + Send + Sync),
    email: &str,
    password: &str,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();

    let user = match repos::users::find_user_by_email(conn, &email).await? {
        Some(user) => user,
        None => {
            warn!(reason = "unknown_email", "login rejected");
            return Err(AppError::unauthorized());
        }
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = user.id, reason = "wrong_password", "login rejected");
        return Err(AppError::unauthorized());
    }

    mint_access_token(
        user.id,
        user.is_admin,
        user.is_business,
        SystemTime::now(),
        security,
    )
}

/// Admin operation: flip the business tier on the live record. Takes effect
/// on the target's next request, outstanding tokens included.
pub async fn set_business_tier(
    conn: &(impl ConnectionTrait + Send + Sync),
    user_id: i64,
    is_business: bool,
) -> Result<users::Model, AppError> {
    let user = repos::users::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found".to_string()))?;

    let updated = repos::users::set_business_tier(conn, user, is_business).await?;
    info!(user_id, is_business, "business tier changed");
    Ok(updated)
}

/// Delete an account: self or admin. Existence is checked first, so an
/// absent user is 404 even for unauthorized callers. Deletion also soft-
/// revokes every outstanding token for that user at the resolver.
pub async fn delete_account(
    conn: &(impl ConnectionTrait + Send + Sync),
    principal: &Principal,
    user_id: i64,
) -> Result<(), AppError> {
    let user = repos::users::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found".to_string()))?;

    if user.id != principal.user_id && !principal.is_admin {
        return Err(AppError::forbidden());
    }

    repos::users::delete_user(conn, user).await?;
    info!(user_id, deleted_by = principal.user_id, "account deleted");
    Ok(())
}
