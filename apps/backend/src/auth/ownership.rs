//! Owner-or-admin check for mutating card routes.

use tracing::debug;

use crate::auth::principal::Principal;
use crate::entities::cards;
use crate::error::AppError;

/// Allow the mutation when the principal owns the card or is an admin.
///
/// Callers must fetch the card first and map an absent row to `NotFound`:
/// existence precedes authorization, so a missing card is 404 for every
/// caller, admins included. Both ids are canonical `i64` (the token's string
/// subject was parsed at resolve time), so this is a plain equality.
pub fn check_ownership(principal: &Principal, card: &cards::Model) -> Result<(), AppError> {
    if card.owner_id == principal.user_id || principal.is_admin {
        return Ok(());
    }
    debug!(
        card_id = card.id,
        owner_id = card.owner_id,
        user_id = principal.user_id,
        "ownership check failed"
    );
    Err(AppError::forbidden())
}
