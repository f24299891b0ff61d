//! Card repository functions, generic over `ConnectionTrait`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::{card_likes, cards};
use crate::error::AppError;

/// Field set required to create a card. `owner_id` comes from the
/// authenticated principal, never from the request body.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub owner_id: i64,
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

/// Mutable card fields. `owner_id` is deliberately absent: ownership is
/// immutable after creation.
#[derive(Debug, Clone)]
pub struct CardPatch {
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

pub async fn find_card_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Option<cards::Model>, AppError> {
    let card = cards::Entity::find_by_id(card_id).one(conn).await?;
    Ok(card)
}

pub async fn list_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<cards::Model>, AppError> {
    let cards = cards::Entity::find()
        .order_by_asc(cards::Column::Id)
        .all(conn)
        .await?;
    Ok(cards)
}

pub async fn list_cards_by_owner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner_id: i64,
) -> Result<Vec<cards::Model>, AppError> {
    let cards = cards::Entity::find()
        .filter(cards::Column::OwnerId.eq(owner_id))
        .order_by_asc(cards::Column::Id)
        .all(conn)
        .await?;
    Ok(cards)
}

pub async fn create_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    new_card: NewCard,
) -> Result<cards::Model, AppError> {
    let now = OffsetDateTime::now_utc();
    let card = cards::ActiveModel {
        owner_id: Set(new_card.owner_id),
        title: Set(new_card.title),
        subtitle: Set(new_card.subtitle),
        description: Set(new_card.description),
        phone: Set(new_card.phone),
        email: Set(new_card.email),
        web: Set(new_card.web),
        image_url: Set(new_card.image_url),
        image_alt: Set(new_card.image_alt),
        street: Set(new_card.street),
        house_number: Set(new_card.house_number),
        city: Set(new_card.city),
        country: Set(new_card.country),
        zip: Set(new_card.zip),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(card)
}

pub async fn update_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card: cards::Model,
    patch: CardPatch,
) -> Result<cards::Model, AppError> {
    let mut active: cards::ActiveModel = card.into();
    active.title = Set(patch.title);
    active.subtitle = Set(patch.subtitle);
    active.description = Set(patch.description);
    active.phone = Set(patch.phone);
    active.email = Set(patch.email);
    active.web = Set(patch.web);
    active.image_url = Set(patch.image_url);
    active.image_alt = Set(patch.image_alt);
    active.street = Set(patch.street);
    active.house_number = Set(patch.house_number);
    active.city = Set(patch.city);
    active.country = Set(patch.country);
    active.zip = Set(patch.zip);
    active.updated_at = Set(OffsetDateTime::now_utc());
    let updated = active.update(conn).await?;
    Ok(updated)
}

pub async fn delete_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card: cards::Model,
) -> Result<(), AppError> {
    card.delete(conn).await?;
    Ok(())
}

pub async fn find_like<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    user_id: i64,
) -> Result<Option<card_likes::Model>, AppError> {
    let like = card_likes::Entity::find()
        .filter(card_likes::Column::CardId.eq(card_id))
        .filter(card_likes::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(like)
}

pub async fn insert_like<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    user_id: i64,
) -> Result<card_likes::Model, AppError> {
    let like = card_likes::ActiveModel {
        card_id: Set(card_id),
        user_id: Set(user_id),
        created_at: Set(OffsetDateTime::now_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(like)
}

pub async fn delete_like<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    like: card_likes::Model,
) -> Result<(), AppError> {
    like.delete(conn).await?;
    Ok(())
}

pub async fn list_like_user_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Vec<i64>, AppError> {
    let likes = card_likes::Entity::find()
        .filter(card_likes::Column::CardId.eq(card_id))
        .all(conn)
        .await?;
    Ok(likes.into_iter().map(|like| like.user_id).collect())
}
