use actix_web::web;

pub mod auth;
pub mod cards;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(crate::health::configure_routes)
        .configure(auth::configure_routes)
        .configure(users::configure_routes)
        .configure(cards::configure_routes);
}
