//! Claims-to-principal resolution against the live user store.

use sea_orm::ConnectionTrait;
use tracing::warn;

use crate::auth::jwt::Claims;
use crate::auth::principal::{Principal, Role};
use crate::error::AppError;
use crate::repos::users;

/// Resolve verified claims to a [`Principal`] backed by the live user record.
///
/// The token is authoritative for subject identity and signature integrity
/// only: the tier flags on the returned principal come from the user row as
/// it exists *now*, so permission changes apply to every subsequent request
/// even while old tokens embedding stale flags are still in circulation.
/// Deleting the user invalidates all outstanding tokens here (soft
/// revocation).
///
/// Failures are indistinguishable from other authentication failures in the
/// response; the reason is logged.
pub async fn resolve_principal<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    claims: &Claims,
) -> Result<Principal, AppError> {
    // Canonicalize the subject to the store's id type exactly once; every
    // later comparison (ownership included) is i64 == i64.
    let user_id: i64 = claims.sub.parse().map_err(|_| {
        warn!(sub = %claims.sub, reason = "malformed_subject", "failed to resolve principal");
        AppError::unauthorized()
    })?;

    let user = users::find_user_by_id(conn, user_id).await?;
    let user = match user {
        Some(user) => user,
        None => {
            warn!(
                user_id,
                reason = "unknown_principal",
                "failed to resolve principal"
            );
            return Err(AppError::unauthorized());
        }
    };

    Ok(Principal {
        user_id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        is_admin: user.is_admin,
        is_business: user.is_business,
        role: Role::derive(user.is_admin, user.is_business),
    })
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use time::OffsetDateTime;

    use super::resolve_principal;
    use crate::auth::jwt::Claims;
    use crate::auth::principal::Role;
    use crate::entities::users;
    use crate::AppError;

    fn claims(sub: &str, is_admin: bool, is_business: bool) -> Claims {
        Claims {
            sub: sub.to_string(),
            is_admin,
            is_business,
            iat: 0,
            exp: i64::MAX,
        }
    }

    fn user_row(id: i64, is_admin: bool, is_business: bool) -> users::Model {
        users::Model {
            id,
            first_name: "Dana".to_string(),
            last_name: "Levy".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_admin,
            is_business,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn live_record_flags_override_token_flags() {
        // Token says plain user; the row has since been upgraded to business.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(5, false, true)]])
            .into_connection();

        let principal = resolve_principal(&db, &claims("5", false, false))
            .await
            .unwrap();

        assert_eq!(principal.user_id, 5);
        assert!(principal.is_business);
        assert_eq!(principal.role, Role::Business);
    }

    #[tokio::test]
    async fn deleted_user_is_unresolvable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        assert!(matches!(
            resolve_principal(&db, &claims("9", true, true)).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn malformed_subject_is_unresolvable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        assert!(matches!(
            resolve_principal(&db, &claims("not-an-id", false, false)).await,
            Err(AppError::Unauthorized)
        ));
    }
}
