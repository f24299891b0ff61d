//! Per-scope rate limiting middleware.
//!
//! Wraps a scope with one of the configured buckets and keys the window on
//! the client network address (real-ip aware, falling back to the peer
//! address). Runs before authentication so abusive sources are cut off
//! without paying for token verification or a store lookup.

use std::future::{ready, Ready};

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, ResponseError};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::error::AppError;
use crate::rate_limit::Bucket;
use crate::state::app_state::AppState;

pub struct RateLimit {
    bucket: Bucket,
}

impl RateLimit {
    pub fn new(bucket: Bucket) -> Self {
        Self { bucket }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            bucket: self.bucket,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    bucket: Bucket,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let source_key = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let verdict = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.limiter.admit(&source_key, self.bucket),
            None => Err(AppError::internal("AppState not available".to_string())),
        };

        if let Err(err) = verdict {
            warn!(
                source = %source_key,
                bucket = ?self.bucket,
                path = %req.path(),
                "request throttled"
            );
            let res = req.into_response(err.error_response()).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
