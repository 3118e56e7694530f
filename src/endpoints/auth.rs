use axum::{extract::State, routing::post, Json, Router};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use validator::Validate;

use crate::error::{AppError, AuthError, Result};
use crate::models::user;
use crate::schemas::{ApiResponse, LoginRequest, RefreshRequest, TokenResponse};
use crate::services::security::{
    create_access_token, create_refresh_token, decode_token, verify_password, TokenType,
};
use crate::state::AppState;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .with_state(state)
}

/// Exchange email and password for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>> {
    request.validate()?;

    let email = request.email.trim().to_lowercase();
    let found_user = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;

    // Same error for unknown email and wrong password
    let found_user = match found_user {
        Some(u) if verify_password(&request.password, &u.hashed_password) => u,
        _ => {
            tracing::warn!("Failed login for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let access_token = create_access_token(&found_user)?;
    let refresh_token = create_refresh_token(&found_user)?;
    tracing::info!(user_id = found_user.id, "User logged in");

    Ok(Json(ApiResponse::new(
        "Login successful",
        TokenResponse {
            access_token,
            refresh_token,
            user: Some(found_user.into()),
        },
    )))
}

/// Trade a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid, expired or non-refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>> {
    let claims = decode_token(&request.refresh_token).map_err(|e| match e {
        AppError::Jwt(_) => AppError::from(AuthError::InvalidToken),
        other => other,
    })?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::AccessTokenUsed.into());
    }

    let found_user = user::Entity::find_by_id(claims.user)
        .one(&state.db)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    Ok(Json(ApiResponse::new(
        "Token refreshed",
        TokenResponse {
            access_token: create_access_token(&found_user)?,
            refresh_token: create_refresh_token(&found_user)?,
            user: None,
        },
    )))
}
