//! Authentication middleware.
//!
//! Extracts the bearer token, verifies it, and resolves the subject against
//! the live user store; the resulting `Principal` is stored in request
//! extensions for guards and handlers. A request *without* a credential
//! passes through untouched — whether that is acceptable is the guard
//! chain's decision — while a request presenting an invalid, expired, or
//! unresolvable token fails 401 immediately.

use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::jwt::verify_access_token;
use crate::auth::principal::Principal;
use crate::auth::resolver::resolve_principal;
use crate::error::AppError;
use crate::state::app_state::AppState;

pub struct Authenticate;

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let auth_header = req.headers().get(header::AUTHORIZATION).cloned();
            let token = match extract_bearer_from_header(auth_header.as_ref()) {
                Ok(token) => token,
                Err(err) => return Ok(reject(req, err)),
            };

            if let Some(token) = token {
                let app_state = match req.app_data::<web::Data<AppState>>().cloned() {
                    Some(state) => state,
                    None => {
                        let err = AppError::internal("AppState not available".to_string());
                        return Ok(reject(req, err));
                    }
                };

                match establish_principal(&token, &app_state).await {
                    Ok(principal) => {
                        req.extensions_mut().insert(principal);
                    }
                    Err(err) => return Ok(reject(req, err)),
                }
            }

            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

/// Verify signature and expiry, then rebuild the principal from the live
/// record. Both steps map failures to the same opaque 401.
async fn establish_principal(token: &str, app_state: &AppState) -> Result<Principal, AppError> {
    let claims = verify_access_token(token, &app_state.security)?;
    let db = app_state.require_db()?;
    resolve_principal(db, &claims).await
}

fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response()).map_into_right_body()
}

/// Parse `Authorization: Bearer <token>`. A missing header is not an error
/// here; a present-but-malformed one is.
fn extract_bearer_from_header(
    header_value: Option<&actix_web::http::header::HeaderValue>,
) -> Result<Option<String>, AppError> {
    let auth_value = match header_value {
        Some(value) => value,
        None => return Ok(None),
    };

    let auth_str = auth_value.to_str().map_err(|_| AppError::unauthorized())?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(AppError::unauthorized());
    }

    let token = parts[1];
    if token.is_empty() {
        return Err(AppError::unauthorized());
    }

    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::HeaderValue;

    use super::extract_bearer_from_header;

    #[test]
    fn missing_header_is_not_an_error() {
        assert_eq!(extract_bearer_from_header(None).unwrap(), None);
    }

    #[test]
    fn well_formed_bearer_is_extracted() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_from_header(Some(&value)).unwrap(),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for raw in ["Token abc", "Bearer", "Bearer a b", "bearer-abc"] {
            let value = HeaderValue::from_static(raw);
            assert!(extract_bearer_from_header(Some(&value)).is_err(), "{raw}");
        }
    }
}
