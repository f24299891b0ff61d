use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::guards::Guard;
use crate::entities::cards;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::middleware::authenticate::Authenticate;
use crate::middleware::guard_chain::Guarded;
use crate::middleware::rate_limit::RateLimit;
use crate::rate_limit::Bucket;
use crate::repos;
use crate::services::cards::{self as card_service, CardInput};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    pub street: String,
    pub house_number: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Update body. Identical to the create body except that `house_number`
/// additionally accepts a JSON number, which is canonicalized to a string
/// before it reaches the domain layer.
#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    pub street: String,
    #[serde(deserialize_with = "string_or_number")]
    pub house_number: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub zip: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

impl From<CreateCardRequest> for CardInput {
    fn from(req: CreateCardRequest) -> Self {
        CardInput {
            title: req.title,
            subtitle: req.subtitle,
            description: req.description,
            phone: req.phone,
            email: req.email,
            web: req.web,
            image_url: req.image_url,
            image_alt: req.image_alt,
            street: req.street,
            house_number: req.house_number,
            city: req.city,
            country: req.country,
            zip: req.zip,
        }
    }
}

impl From<UpdateCardRequest> for CardInput {
    fn from(req: UpdateCardRequest) -> Self {
        CardInput {
            title: req.title,
            subtitle: req.subtitle,
            description: req.description,
            phone: req.phone,
            email: req.email,
            web: req.web,
            image_url: req.image_url,
            image_alt: req.image_alt,
            street: req.street,
            house_number: req.house_number,
            city: req.city,
            country: req.country,
            zip: req.zip,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: i64,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<Vec<i64>>,
}

impl CardResponse {
    fn from_model(card: cards::Model, likes: Option<Vec<i64>>) -> Self {
        Self {
            id: card.id,
            owner_id: card.owner_id,
            title: card.title,
            subtitle: card.subtitle,
            description: card.description,
            phone: card.phone,
            email: card.email,
            web: card.web,
            image_url: card.image_url,
            image_alt: card.image_alt,
            street: card.street,
            house_number: card.house_number,
            city: card.city,
            country: card.country,
            zip: card.zip,
            likes,
        }
    }
}

async fn list_cards(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let cards = repos::cards::list_cards(db).await?;
    let cards: Vec<CardResponse> = cards
        .into_iter()
        .map(|card| CardResponse::from_model(card, None))
        .collect();
    Ok(HttpResponse::Ok().json(cards))
}

async fn my_cards(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let cards = repos::cards::list_cards_by_owner(db, user.user_id).await?;
    let cards: Vec<CardResponse> = cards
        .into_iter()
        .map(|card| CardResponse::from_model(card, None))
        .collect();
    Ok(HttpResponse::Ok().json(cards))
}

async fn get_card(
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let card = card_service::get_card(db, path.into_inner()).await?;
    let likes = repos::cards::list_like_user_ids(db, card.id).await?;
    Ok(HttpResponse::Ok().json(CardResponse::from_model(card, Some(likes))))
}

async fn create_card(
    req: web::Json<CreateCardRequest>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let card = card_service::create_card(db, &user, req.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(CardResponse::from_model(card, None)))
}

async fn update_card(
    path: web::Path<i64>,
    req: web::Json<UpdateCardRequest>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let card =
        card_service::update_card(db, &user, path.into_inner(), req.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(CardResponse::from_model(card, None)))
}

async fn delete_card(
    path: web::Path<i64>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    card_service::delete_card(db, &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn toggle_like(
    path: web::Path<i64>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let likes = card_service::toggle_like(db, &user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(likes))
}

/// Card routes mix public reads with guarded mutations, so every route
/// declares its own stack explicitly: rate-limit bucket first, then
/// authentication, then its guard chain (wraps execute outermost-last, so
/// declaration order here is reversed).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/cards")
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_cards)
                            .wrap(RateLimit::new(Bucket::General)),
                    )
                    .route(
                        web::post()
                            .to(create_card)
                            .wrap(Guarded::new(vec![
                                Guard::Authenticated,
                                Guard::BusinessOrAdmin,
                            ]))
                            .wrap(Authenticate)
                            .wrap(RateLimit::new(Bucket::Creation)),
                    ),
            )
            .service(
                web::resource("/mine").route(
                    web::get()
                        .to(my_cards)
                        .wrap(Guarded::new(vec![Guard::Authenticated]))
                        .wrap(Authenticate)
                        .wrap(RateLimit::new(Bucket::General)),
                ),
            )
            .service(
                web::resource("/{id}/like").route(
                    web::patch()
                        .to(toggle_like)
                        .wrap(Guarded::new(vec![Guard::Authenticated]))
                        .wrap(Authenticate)
                        .wrap(RateLimit::new(Bucket::General)),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_card)
                            .wrap(RateLimit::new(Bucket::General)),
                    )
                    .route(
                        web::put()
                            .to(update_card)
                            .wrap(Guarded::new(vec![Guard::Authenticated]))
                            .wrap(Authenticate)
                            .wrap(RateLimit::new(Bucket::General)),
                    )
                    .route(
                        web::delete()
                            .to(delete_card)
                            .wrap(Guarded::new(vec![Guard::Authenticated]))
                            .wrap(Authenticate)
                            .wrap(RateLimit::new(Bucket::General)),
                    ),
            ),
    );
}
