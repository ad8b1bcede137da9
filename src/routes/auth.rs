use crate::{
    auth::{SigninRequest, SignupRequest},
    error::AppError,
    services::AuthService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `AuthResponse` with the new user's id and token.
/// - `422 Unprocessable Entity`: invalid email, password shorter than 8 characters,
///   or an email that is already registered.
#[post("/signup")]
pub async fn signup(
    service: web::Data<AuthService>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let response = service.signup(signup_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Sign in
///
/// Exchanges an email and password for a fresh token. Unknown emails and wrong passwords
/// produce the same `401`.
#[post("/signin")]
pub async fn signin(
    service: web::Data<AuthService>,
    signin_data: web::Json<SigninRequest>,
) -> Result<impl Responder, AppError> {
    let response = service.signin(signin_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
