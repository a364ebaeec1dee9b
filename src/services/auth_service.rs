use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::web::models::Claims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT creation failed: {0}")]
    TokenCreation(jsonwebtoken::errors::Error),
    #[error("Invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("Password hashing failed: {0}")]
    PasswordHashing(#[from] bcrypt::BcryptError),
}

/// Issues and verifies HS256 tokens signed with the shared server secret.
/// Expiry is the only invalidation mechanism.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_lifetime(secret, Duration::hours(1))
    }

    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            lifetime,
        }
    }

    pub fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            iat: now.timestamp() as usize,
            exp: (now + self.lifetime).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::TokenCreation)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(AuthError::InvalidToken)
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, password_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_carries_user_id_and_one_hour_expiry() {
        let tokens = TokenService::new("secret");
        let token = tokens.issue_token(42).unwrap();
        let claims = tokens.verify_token(&token).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("one").issue_token(1).unwrap();
        let result = TokenService::new("two").verify_token(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::with_lifetime("secret", Duration::hours(-2));
        let token = tokens.issue_token(7).unwrap();
        assert!(matches!(tokens.verify_token(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let tokens = TokenService::new("secret");
        assert!(tokens.verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hashed = hash_password("hunter22", 4).unwrap();
        assert_ne!(hashed, "hunter22");
        assert!(verify_password("hunter22", &hashed).unwrap());
        assert!(!verify_password("hunter23", &hashed).unwrap());
    }
}
