use actix_web::web;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{AuthResponse, PasswordHasher, SigninRequest, SignupRequest, TokenService};
use crate::error::AppError;
use crate::models::User;
use crate::store::{StoreError, UserRepository};

/// Shared by every signin failure so that registered emails cannot be enumerated.
pub const INVALID_SIGNIN: &str = "Invalid email or password";
pub const EMAIL_TAKEN: &str = "Email already exists";

// Checked against when the email is unknown so both signin failures cost one bcrypt verify.
const DUMMY_PASSWORD: &str = "taskledger-no-such-account";

/// Signup and signin orchestration.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
    dummy_digest: String,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        let dummy_digest = hasher.hash(DUMMY_PASSWORD).unwrap_or_else(|e| {
            log::error!("Could not prepare the signin dummy digest: {}", e);
            String::new()
        });
        Self {
            users,
            hasher,
            tokens,
            dummy_digest,
        }
    }

    /// Creates an account and returns its first token.
    ///
    /// The email pre-check gives a clean error in the common case; the store's unique
    /// constraint is what actually decides a race between two signups.
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }

        let hasher = self.hasher;
        let password = request.password;
        let password_hash = web::block(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))??;

        let user = match self
            .users
            .insert(&User::new(request.email, password_hash))
            .await
        {
            Ok(user) => user,
            Err(StoreError::UniqueViolation(constraint)) => {
                log::info!("Signup lost a uniqueness race on {}", constraint);
                return Err(AppError::Conflict(EMAIL_TAKEN.into()));
            }
            Err(e) => return Err(e.into()),
        };

        log::info!("Registered user {}", user.id);
        self.respond(user)
    }

    /// Verifies credentials and issues a fresh token.
    pub async fn signin(&self, request: SigninRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let user = self.users.find_by_email(&request.email).await?;

        let hasher = self.hasher;
        let password = request.password;
        let digest = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_digest.clone(),
        };
        let matches = web::block(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        match user {
            Some(user) if matches => self.respond(user),
            Some(user) => {
                log::debug!("Signin with wrong password for user {}", user.id);
                Err(AppError::Unauthorized(INVALID_SIGNIN.into()))
            }
            None => {
                log::debug!("Signin for unknown email");
                Err(AppError::Unauthorized(INVALID_SIGNIN.into()))
            }
        }
    }

    fn respond(&self, user: User) -> Result<AuthResponse, AppError> {
        let token = self.tokens.issue(user.id, Some(&user.email))?;
        Ok(AuthResponse {
            user_id: user.id,
            email: user.email,
            token,
            created_at: user.created_at,
        })
    }
}
