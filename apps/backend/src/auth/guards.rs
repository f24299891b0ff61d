//! Composable, order-sensitive authorization guards.
//!
//! A route declares an ordered chain; evaluation is left-to-right and the
//! first failing guard short-circuits with its own error. Nothing is
//! prepended implicitly, so a chain that wants "401 before 403" must list
//! `Authenticated` first.

use crate::auth::principal::Principal;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A principal was resolved for this request.
    Authenticated,
    /// The live record carries the admin flag.
    Admin,
    /// The live record carries either the business or the admin flag.
    BusinessOrAdmin,
}

impl Guard {
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AppError> {
        match self {
            Guard::Authenticated => match principal {
                Some(_) => Ok(()),
                None => Err(AppError::unauthorized()),
            },
            Guard::Admin => match principal {
                Some(p) if p.is_admin => Ok(()),
                _ => Err(AppError::forbidden()),
            },
            Guard::BusinessOrAdmin => match principal {
                Some(p) if p.is_business || p.is_admin => Ok(()),
                _ => Err(AppError::forbidden_business_required()),
            },
        }
    }
}

/// Typed ordered list of guards for one route.
#[derive(Debug, Clone, Default)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    pub fn new(guards: impl Into<Vec<Guard>>) -> Self {
        Self {
            guards: guards.into(),
        }
    }

    /// Evaluate left-to-right; the first failure wins and later guards are
    /// never consulted.
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AppError> {
        for guard in &self.guards {
            guard.check(principal)?;
        }
        Ok(())
    }
}

impl From<Vec<Guard>> for GuardChain {
    fn from(guards: Vec<Guard>) -> Self {
        Self::new(guards)
    }
}

#[cfg(test)]
mod tests {
    use super::{Guard, GuardChain};
    use crate::auth::principal::{Principal, Role};
    use crate::AppError;

    fn principal(is_admin: bool, is_business: bool) -> Principal {
        Principal {
            user_id: 1,
            email: "p@example.com".to_string(),
            first_name: "Pat".to_string(),
            last_name: "Quinn".to_string(),
            is_admin,
            is_business,
            role: Role::derive(is_admin, is_business),
        }
    }

    #[test]
    fn authenticated_requires_a_principal() {
        assert!(Guard::Authenticated.check(None).is_err());
        assert!(Guard::Authenticated
            .check(Some(&principal(false, false)))
            .is_ok());
    }

    #[test]
    fn admin_guard() {
        assert!(matches!(
            Guard::Admin.check(Some(&principal(false, true))),
            Err(AppError::Forbidden)
        ));
        assert!(Guard::Admin.check(Some(&principal(true, false))).is_ok());
    }

    #[test]
    fn business_or_admin_guard() {
        assert!(Guard::BusinessOrAdmin
            .check(Some(&principal(false, true)))
            .is_ok());
        assert!(Guard::BusinessOrAdmin
            .check(Some(&principal(true, false)))
            .is_ok());
        assert!(matches!(
            Guard::BusinessOrAdmin.check(Some(&principal(false, false))),
            Err(AppError::ForbiddenBusinessRequired)
        ));
    }

    #[test]
    fn chain_short_circuits_on_first_failure() {
        // With Authenticated first, an anonymous caller sees 401, not 403.
        let chain = GuardChain::new(vec![Guard::Authenticated, Guard::Admin]);
        assert!(matches!(chain.check(None), Err(AppError::Unauthorized)));

        // Without it, the same caller sees the role guard's 403 instead;
        // ordering is the route's explicit choice.
        let bare = GuardChain::new(vec![Guard::Admin]);
        assert!(matches!(bare.check(None), Err(AppError::Forbidden)));
    }

    #[test]
    fn chain_passes_when_all_guards_pass() {
        let chain = GuardChain::new(vec![Guard::Authenticated, Guard::BusinessOrAdmin]);
        assert!(chain.check(Some(&principal(false, true))).is_ok());
    }

    #[test]
    fn empty_chain_admits_everyone() {
        assert!(GuardChain::default().check(None).is_ok());
    }
}
