use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::referral_code;
use crate::models::user::{self, UserRole};
use crate::schemas::booking::BookingResponse;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[serde(default, alias = "referralCode")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            points: user.points,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferralCodeResponse {
    pub id: i64,
    pub code: String,
    pub referral_points: i64,
    pub count_used: i32,
    pub created_at: DateTime<Utc>,
}

impl From<referral_code::Model> for ReferralCodeResponse {
    fn from(code: referral_code::Model) -> Self {
        Self {
            id: code.id,
            code: code.code,
            referral_points: code.referral_points,
            count_used: code.count_used,
            created_at: code.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub referral_code: ReferralCodeResponse,
}

/// Full profile: balance, own referral codes and booking history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub referral_codes: Vec<ReferralCodeResponse>,
    pub bookings: Vec<BookingResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let ok = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            referral_code: None,
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            referral_code: None,
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_refresh_request_accepts_both_spellings() {
        let camel: RefreshRequest = serde_json::from_str(r#"{"refreshToken":"a"}"#).unwrap();
        let snake: RefreshRequest = serde_json::from_str(r#"{"refresh_token":"b"}"#).unwrap();
        assert_eq!(camel.refresh_token, "a");
        assert_eq!(snake.refresh_token, "b");
    }
}
