//! Request-scoped identity and role context.

use serde::{Deserialize, Serialize};

/// Effective role for one request, derived from the two tier flags on the
/// live user record. Derived once per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Business,
    User,
}

impl Role {
    /// Admin wins over business; everyone else is a plain user.
    pub fn derive(is_admin: bool, is_business: bool) -> Self {
        if is_admin {
            Role::Admin
        } else if is_business {
            Role::Business
        } else {
            Role::User
        }
    }
}

/// The resolved identity for one authenticated request.
///
/// Reconstructed fresh from the backing user record on every request —
/// the flags here are the *live* flags, not the ones embedded in the token.
/// Never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub is_business: bool,
    pub role: Role,
}
