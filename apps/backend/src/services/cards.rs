//! Card lifecycle. Every mutation of an existing card fetches first (404)
//! and then runs the ownership check (403); the order is a contract, not an
//! accident.

use lazy_regex::regex_is_match;
use sea_orm::ConnectionTrait;
use tracing::info;

use crate::auth::ownership::check_ownership;
use crate::auth::principal::Principal;
use crate::entities::cards;
use crate::error::AppError;
use crate::repos;
use crate::repos::cards::{CardPatch, NewCard};

/// Card fields as accepted from a request, before ownership is attached.
#[derive(Debug, Clone)]
pub struct CardInput {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub web: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub country: String,
    pub zip: Option<String>,
}

fn validate_card_input(input: &CardInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::invalid(
            "INVALID_TITLE",
            "Card title is required".to_string(),
        ));
    }
    if !regex_is_match!(r"^0[0-9]{1,2}-?[0-9]{7}$", &input.phone) {
        return Err(AppError::invalid(
            "INVALID_PHONE",
            "Phone must be a valid phone number".to_string(),
        ));
    }
    if !regex_is_match!(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", &input.email) {
        return Err(AppError::invalid(
            "INVALID_EMAIL",
            "Card email is not valid".to_string(),
        ));
    }
    Ok(())
}

fn card_not_found() -> AppError {
    AppError::not_found("CARD_NOT_FOUND", "Card not found".to_string())
}

/// Create a card owned by the calling principal. Route-level guards already
/// enforced the business-or-admin requirement; `owner_id` is taken from the
/// principal and is immutable from here on.
pub async fn create_card(
    conn: &(impl ConnectionTrait + Send + Sync),
    principal: &Principal,
    input: CardInput,
) -> Result<cards::Model, AppError> {
    validate_card_input(&input)?;

    let card = repos::cards::create_card(
        conn,
        NewCard {
            owner_id: principal.user_id,
            title: input.title,
            subtitle: input.subtitle,
            description: input.description,
            phone: input.phone,
            email: input.email,
            web: input.web,
            image_url: input.image_url,
            image_alt: input.image_alt,
            street: input.street,
            house_number: input.house_number,
            city: input.city,
            country: input.country,
            zip: input.zip,
        },
    )
    .await?;

    info!(card_id = card.id, owner_id = card.owner_id, "card created");
    Ok(card)
}

pub async fn get_card(
    conn: &(impl ConnectionTrait + Send + Sync),
    card_id: i64,
) -> Result<cards::Model, AppError> {
    repos::cards::find_card_by_id(conn, card_id)
        .await?
        .ok_or_else(card_not_found)
}

pub async fn update_card(
    conn: &(impl ConnectionTrait + Send + Sync),
    principal: &Principal,
    card_id: i64,
    input: CardInput,
) -> Result<cards::Model, AppError> {
    // Existence precedes authorization.
    let card = repos::cards::find_card_by_id(conn, card_id)
        .await?
        .ok_or_else(card_not_found)?;
    check_ownership(principal, &card)?;

    validate_card_input(&input)?;

    let updated = repos::cards::update_card(
        conn,
        card,
        CardPatch {
            title: input.title,
            subtitle: input.subtitle,
            description: input.description,
            phone: input.phone,
            email: input.email,
            web: input.web,
            image_url: input.image_url,
            image_alt: input.image_alt,
            street: input.street,
            house_number: input.house_number,
            city: input.city,
            country: input.country,
            zip: input.zip,
        },
    )
    .await?;

    info!(card_id, updated_by = principal.user_id, "card updated");
    Ok(updated)
}

pub async fn delete_card(
    conn: &(impl ConnectionTrait + Send + Sync),
    principal: &Principal,
    card_id: i64,
) -> Result<(), AppError> {
    let card = repos::cards::find_card_by_id(conn, card_id)
        .await?
        .ok_or_else(card_not_found)?;
    check_ownership(principal, &card)?;

    repos::cards::delete_card(conn, card).await?;
    info!(card_id, deleted_by = principal.user_id, "card deleted");
    Ok(())
}

/// Toggle the caller's like on a card. Returns the user ids currently liking
/// the card after the toggle.
pub async fn toggle_like(
    conn: &(impl ConnectionTrait + Send + Sync),
    principal: &Principal,
    card_id: i64,
) -> Result<Vec<i64>, AppError> {
    let card = repos::cards::find_card_by_id(conn, card_id)
        .await?
        .ok_or_else(card_not_found)?;

    match repos::cards::find_like(conn, card.id, principal.user_id).await? {
        Some(like) => repos::cards::delete_like(conn, like).await?,
        None => {
            repos::cards::insert_like(conn, card.id, principal.user_id).await?;
        }
    }

    repos::cards::list_like_user_ids(conn, card.id).await
}

#[cfg(test)]
mod tests {
    use super::{validate_card_input, CardInput};

    fn input() -> CardInput {
        CardInput {
            title: "Cafe".to_string(),
            subtitle: "Espresso bar".to_string(),
            description: "Coffee and pastries".to_string(),
            phone: "050-1234567".to_string(),
            email: "cafe@example.com".to_string(),
            web: None,
            image_url: None,
            image_alt: None,
            street: "Allenby".to_string(),
            house_number: "12".to_string(),
            city: "Tel Aviv".to_string(),
            country: "Israel".to_string(),
            zip: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_card_input(&input()).is_ok());
    }

    #[test]
    fn empty_title_fails() {
        let mut bad = input();
        bad.title = "  ".to_string();
        assert!(validate_card_input(&bad).is_err());
    }

    #[test]
    fn phone_shape() {
        let mut card = input();
        card.phone = "0501234567".to_string();
        assert!(validate_card_input(&card).is_ok());
        card.phone = "12345".to_string();
        assert!(validate_card_input(&card).is_err());
    }
}
