//! Route-level guard enforcement.
//!
//! `Guarded` wraps a scope or resource with an explicit, ordered
//! [`GuardChain`]. It reads the `Principal` the `Authenticate` middleware
//! may have stored in request extensions and rejects the request on the
//! first failing guard; ordering is whatever the route declared, nothing is
//! prepended implicitly.

use std::future::{ready, Ready};

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::auth::guards::{Guard, GuardChain};
use crate::auth::principal::Principal;

pub struct Guarded {
    chain: GuardChain,
}

impl Guarded {
    pub fn new(guards: impl Into<Vec<Guard>>) -> Self {
        Self {
            chain: GuardChain::new(guards),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Guarded
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GuardedMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GuardedMiddleware {
            service,
            chain: self.chain.clone(),
        }))
    }
}

pub struct GuardedMiddleware<S> {
    service: S,
    chain: GuardChain,
}

impl<S, B> Service<ServiceRequest> for GuardedMiddleware<S>
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
        let verdict = {
            let extensions = req.extensions();
            let principal = extensions.get::<Principal>();
            self.chain.check(principal)
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Err(err) => {
                let res = req.into_response(err.error_response()).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
