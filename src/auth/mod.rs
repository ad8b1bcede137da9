pub mod extractors;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Re-export necessary items
pub use extractors::{AuthenticatedUser, MaybeAuthenticated};
pub use guard::{authenticate, authenticate_optional, authorize_ownership, extract_bearer};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Represents the payload for a new account.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Represents the payload for a signin request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Response structure after successful signup or signin.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The unique identifier of the authenticated user.
    pub user_id: Uuid,
    pub email: String,
    /// The JWT access token for subsequent requests.
    pub token: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
