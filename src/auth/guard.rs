//! Request-level authentication and URL-level ownership checks.
//!
//! Every way a credential can fail collapses into the same `Unauthorized` message,
//! so a client cannot tell a forged token from an expired one.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::auth::token::TokenService;
use crate::error::AppError;

pub const INVALID_CREDENTIALS: &str = "Invalid or expired authentication token";
pub const ACCESS_DENIED: &str = "You do not have permission to access this resource";

lazy_static! {
    // Case-insensitive scheme, exactly one space, then a single token with no whitespace.
    static ref BEARER_RE: Regex = Regex::new(r"^(?i:bearer) (\S+)$").unwrap();
}

fn unauthorized() -> AppError {
    AppError::Unauthorized(INVALID_CREDENTIALS.into())
}

/// Extracts the token from an `Authorization` header value of the form `Bearer <token>`.
pub fn extract_bearer(value: &str) -> Option<&str> {
    BEARER_RE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str())
}

/// Resolves the caller's identity from the bearer token in `headers`.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<Uuid, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;
    let token = extract_bearer(value).ok_or_else(unauthorized)?;
    tokens.verify(token).ok_or_else(unauthorized)
}

/// Like `authenticate`, but an absent `Authorization` header yields `Ok(None)`.
///
/// A header that is present but invalid still fails.
pub fn authenticate_optional(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<Option<Uuid>, AppError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Ok(None);
    }
    authenticate(headers, tokens).map(Some)
}

/// Checks that the owner id in the URL is the authenticated identity.
///
/// Only the canonical lowercase hyphenated spelling matches; any other spelling of the
/// same id is a mismatch. Returns the owner id on success.
pub fn authorize_ownership(url_owner_id: &str, identity: Uuid) -> Result<Uuid, AppError> {
    if url_owner_id == identity.hyphenated().to_string() {
        return Ok(identity);
    }
    log::warn!(
        "User {} attempted to access resources of {:?}",
        identity,
        url_owner_id
    );
    Err(AppError::Forbidden(ACCESS_DENIED.into()))
}
