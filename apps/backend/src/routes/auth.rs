use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use super::users::UserResponse;
use crate::error::AppError;
use crate::middleware::rate_limit::RateLimit;
use crate::rate_limit::Bucket;
use crate::services::users::{self, RegisterInput};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_business: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

async fn register(
    req: web::Json<RegisterRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let req = req.into_inner();

    let user = users::register(
        db,
        RegisterInput {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
            is_business: req.is_business,
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

async fn login(
    req: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;

    let token = users::login(db, &req.email, &req.password, &app_state.security).await?;

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

/// Registration and login share the strictest bucket; both endpoints are
/// anonymous by nature, so no authentication or guards apply here.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .wrap(RateLimit::new(Bucket::Auth))
            .service(web::resource("/register").route(web::post().to(register)))
            .service(web::resource("/login").route(web::post().to(login))),
    );
}
