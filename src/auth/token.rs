use crate::config::{ConfigError, MIN_SECRET_LEN};
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id. The only claim trusted for authorization.
    pub sub: Uuid,
    /// The user's email, carried for display purposes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies HS256-signed bearer tokens.
///
/// Verification is stateless: a token stays valid for its whole lifetime once issued.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Builds the service from the shared signing secret.
    ///
    /// Secrets shorter than 32 bytes are refused.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {} bytes long", MIN_SECRET_LEN),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Issues a token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: Uuid, email: Option<&str>) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, email, self.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token lifetime out of range".into()))?;
        let claims = Claims {
            sub: user_id,
            email: email.map(String::from),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verifies signature and expiry and returns the decoded claims.
    ///
    /// Every failure (malformed, forged, expired, undecodable) yields `None`; the
    /// cause is only logged.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("Rejected bearer token: {:?}", e.kind());
                None
            }
        }
    }

    /// Returns the subject of a valid token.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        self.decode(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_for_gen_verify_0123456789";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24)).unwrap()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let user_id = Uuid::new_v4();
        let token = service().issue(user_id, Some("user@example.com")).unwrap();

        assert_eq!(service().verify(&token), Some(user_id));

        let claims = service().decode(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_short_secret_is_refused() {
        assert!(TokenService::new("short-secret", Duration::hours(1)).is_err());
        assert!(TokenService::new(&"s".repeat(31), Duration::hours(1)).is_err());
        assert!(TokenService::new(&"s".repeat(32), Duration::hours(1)).is_ok());
    }

    #[test]
    fn test_token_expiration() {
        let token = service()
            .issue_with_ttl(Uuid::new_v4(), None, Duration::seconds(-5))
            .unwrap();
        assert_eq!(service().verify(&token), None);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        // Representable as a duration, but far past the last representable date.
        let service = TokenService::new(SECRET, Duration::hours(2_000_000_000_000)).unwrap();
        let err = service.issue(Uuid::new_v4(), None).unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = service().issue(Uuid::new_v4(), None).unwrap();
        let payload_start = token.find('.').unwrap() + 1;

        let mut bytes = token.into_bytes();
        bytes[payload_start] = if bytes[payload_start] == b'e' { b'f' } else { b'e' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(service().verify(&tampered), None);
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new("a_completely_different_secret_value!!", Duration::hours(1))
            .unwrap();
        let token = other.issue(Uuid::new_v4(), None).unwrap();
        assert_eq!(service().verify(&token), None);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9..", "...."] {
            assert_eq!(service().verify(token), None, "accepted {:?}", token);
        }
    }

    #[test]
    fn test_other_algorithms_are_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: None,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(service().verify(&token), None);
    }

    #[test]
    fn test_token_without_subject_is_rejected() {
        #[derive(Serialize)]
        struct Anonymous {
            exp: i64,
        }
        let token = encode(
            &Header::default(),
            &Anonymous {
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(service().verify(&token), None);
    }
}
