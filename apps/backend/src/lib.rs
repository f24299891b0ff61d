#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod health;
pub mod infra;
pub mod middleware;
pub mod rate_limit;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;

#[cfg(test)]
mod test_bootstrap;

// Re-exports for public API
pub use auth::guards::{Guard, GuardChain};
pub use auth::jwt::{mint_access_token, verify_access_token, Claims};
pub use auth::ownership::check_ownership;
pub use auth::principal::{Principal, Role};
pub use auth::resolver::resolve_principal;
pub use error::AppError;
pub use extractors::CurrentUser;
pub use infra::db::connect_db;
pub use middleware::authenticate::Authenticate;
pub use middleware::cors::cors_middleware;
pub use middleware::guard_chain::Guarded;
pub use middleware::rate_limit::RateLimit;
pub use middleware::request_trace::RequestTrace;
pub use middleware::security_headers::SecurityHeaders;
pub use middleware::structured_logger::StructuredLogger;
pub use middleware::trace_span::TraceSpan;
pub use rate_limit::{Bucket, BucketConfig, RateLimitConfig, RateLimiter};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::init();
}
