use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

pub mod otp;
pub mod password;

/// Access level recorded in JWT claims. Admin accounts may call /api/admin routes.
pub const ACCESS_ADMIN: &str = "admin";
pub const ACCESS_USER: &str = "user";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub name: String,
    pub access: String,
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: String, name: String, access: String, user_id: Uuid) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            email,
            name,
            access,
            user_id,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn for_user(user: &crate::database::models::User) -> Self {
        let access = if user.is_admin || user.is_superuser {
            ACCESS_ADMIN
        } else {
            ACCESS_USER
        };
        Self::new(user.email.clone(), user.name.clone(), access.to_string(), user.id)
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn generated_token_round_trips() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            "buyer@example.com".to_string(),
            "Buyer".to_string(),
            ACCESS_USER.to_string(),
            user_id,
        );
        let token = generate_jwt(claims).expect("token");

        let secret = &config::config().security.jwt_secret;
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .expect("decode");

        assert_eq!(decoded.claims.email, "buyer@example.com");
        assert_eq!(decoded.claims.access, ACCESS_USER);
        assert_eq!(decoded.claims.user_id, user_id);
        assert!(decoded.claims.exp > decoded.claims.iat);
    }
}
