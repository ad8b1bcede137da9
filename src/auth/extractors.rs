use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::guard::{authenticate_optional, INVALID_CREDENTIALS};
use crate::auth::token::TokenService;
use crate::error::AppError;

/// The authenticated caller's user id.
///
/// Inserted into request extensions by `AuthMiddleware`; extracting it on a route the
/// middleware does not cover fails with `Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()).into())),
        }
    }
}

/// Identity for endpoints that serve both anonymous and authenticated callers.
///
/// `None` when no `Authorization` header was sent; an invalid header is still rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeAuthenticated(pub Option<Uuid>);

impl FromRequest for MaybeAuthenticated {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => authenticate_optional(req.headers(), tokens).map(MaybeAuthenticated),
            None => Err(AppError::InternalServerError(
                "TokenService is not registered as application data".into(),
            )),
        };
        ready(result.map_err(Into::into))
    }
}
