use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::principal::Principal;
use crate::error::AppError;

/// The principal resolved for this request by the `Authenticate` middleware.
///
/// Fails 401 when no principal is attached. Routes that merely want the
/// failure to happen earlier (and with explicit ordering) should also
/// declare a guard chain starting with `Guard::Authenticated`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl Deref for CurrentUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let principal = req.extensions().get::<Principal>().cloned();
        ready(principal.map(CurrentUser).ok_or_else(AppError::unauthorized))
    }
}
