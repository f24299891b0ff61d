use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::auth::guards::Guard;
use crate::entities::users;
use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::middleware::authenticate::Authenticate;
use crate::middleware::guard_chain::Guarded;
use crate::middleware::rate_limit::RateLimit;
use crate::rate_limit::Bucket;
use crate::repos;
use crate::services::users as user_service;
use crate::state::app_state::AppState;

/// Public view of a user record; the password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_business: bool,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
            is_business: user.is_business,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetBusinessRequest {
    pub is_business: bool,
}

/// The live principal, straight from this request's resolution.
async fn me(user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(user.0))
}

async fn list_users(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let users = repos::users::list_users(db).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

async fn set_business_tier(
    path: web::Path<i64>,
    req: web::Json<SetBusinessRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    let user = user_service::set_business_tier(db, path.into_inner(), req.is_business).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn delete_user(
    path: web::Path<i64>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = app_state.require_db()?;
    user_service::delete_account(db, &user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every user route requires authentication; admin-only routes say so
/// explicitly, with `Authenticated` listed first so anonymous callers get
/// 401 rather than 403.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .wrap(Authenticate)
            .wrap(RateLimit::new(Bucket::General))
            .service(
                web::resource("/me").route(
                    web::get()
                        .to(me)
                        .wrap(Guarded::new(vec![Guard::Authenticated])),
                ),
            )
            .service(
                web::resource("").route(
                    web::get()
                        .to(list_users)
                        .wrap(Guarded::new(vec![Guard::Authenticated, Guard::Admin])),
                ),
            )
            .service(
                web::resource("/{id}/business").route(
                    web::patch()
                        .to(set_business_tier)
                        .wrap(Guarded::new(vec![Guard::Authenticated, Guard::Admin])),
                ),
            )
            .service(
                web::resource("/{id}").route(
                    web::delete()
                        .to(delete_user)
                        .wrap(Guarded::new(vec![Guard::Authenticated])),
                ),
            ),
    );
}
