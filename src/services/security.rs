use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::user::{self, UserRole};

/// Length of generated referral codes
pub const REFERRAL_CODE_LEN: usize = 8;

const REFERRAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: i64, // User id
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    pub jti: String, // Keeps two tokens minted in the same second distinct
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with_cost(password, CONFIG.auth.bcrypt_cost)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Create a JWT access token for the user
pub fn create_access_token(user: &user::Model) -> Result<String> {
    create_token(
        user.id,
        user.role,
        TokenType::Access,
        CONFIG.auth.access_token_ttl,
    )
}

/// Create a JWT refresh token for the user
pub fn create_refresh_token(user: &user::Model) -> Result<String> {
    create_token(
        user.id,
        user.role,
        TokenType::Refresh,
        CONFIG.auth.refresh_token_ttl,
    )
}

/// Sign a token with an explicit lifetime in seconds
pub fn create_token(
    user_id: i64,
    role: UserRole,
    token_type: TokenType,
    expires_in: i64,
) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expires_in);

    let claims = Claims {
        user: user_id,
        role,
        iat: now.timestamp(),
        exp: exp.timestamp(),
        token_type,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| e.into())
}

/// Decode and validate a JWT token
pub fn decode_token(token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No clock skew tolerance for expiration check
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

/// Generate a random referral code of uppercase letters and digits
pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..REFERRAL_CHARSET.len());
            REFERRAL_CHARSET[idx] as char
        })
        .collect()
}
