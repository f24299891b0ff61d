#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{test, web, App, Error};
use backend::entities::{card_likes, cards, users};
use backend::{routes, AppState, RateLimitConfig, RequestTrace, SecurityConfig};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use time::OffsetDateTime;

/// App with the full route surface over the given (usually mock) database,
/// default rate limits, and the test signing secret.
pub fn test_app(
    db: DatabaseConnection,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let state = AppState::new(db, test_security(), RateLimitConfig::default());
    App::new()
        .wrap(RequestTrace)
        .app_data(web::Data::new(state))
        .configure(routes::configure)
}

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes())
}

/// A token signed with the test secret; the tier flags are the snapshot
/// embedded at issuance, not necessarily the live ones.
pub fn token_for(user_id: i64, is_admin: bool, is_business: bool) -> String {
    backend::mint_access_token(
        user_id,
        is_admin,
        is_business,
        std::time::SystemTime::now(),
        &test_security(),
    )
    .unwrap()
}

pub fn user_row(id: i64, email: &str, is_admin: bool, is_business: bool) -> users::Model {
    users::Model {
        id,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        is_admin,
        is_business,
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn user_row_with_password(
    id: i64,
    email: &str,
    is_business: bool,
    password: &str,
) -> users::Model {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let mut user = user_row(id, email, false, is_business);
    user.password_hash = hash;
    user
}

pub fn card_row(id: i64, owner_id: i64) -> cards::Model {
    let now = OffsetDateTime::now_utc();
    cards::Model {
        id,
        owner_id,
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
        created_at: now,
        updated_at: now,
    }
}

pub fn like_row(id: i64, card_id: i64, user_id: i64) -> card_likes::Model {
    card_likes::Model {
        id,
        card_id,
        user_id,
        created_at: OffsetDateTime::now_utc(),
    }
}

/// A request body that passes card validation.
pub fn card_body() -> Value {
    serde_json::json!({
        "title": "Cafe",
        "subtitle": "Espresso bar",
        "description": "Coffee and pastries",
        "phone": "050-1234567",
        "email": "cafe@example.com",
        "street": "Allenby",
        "house_number": "12",
        "city": "Tel Aviv",
        "country": "Israel"
    })
}

/// Assert an RFC 7807 problem body with the expected status and code.
pub async fn assert_problem_details<B: MessageBody>(
    resp: ServiceResponse<B>,
    status: u16,
    code: &str,
) -> Value {
    assert_eq!(resp.status().as_u16(), status);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], status);
    assert_eq!(body["code"], code);
    assert!(body["detail"].is_string());
    assert!(body["trace_id"].is_string());
    body
}
