//! Bearer token authentication for API routes
//!
//! Everything behind this layer needs a valid access token. The resolved user
//! is stored in request extensions for handlers and extractors.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::EntityTrait;

use crate::error::{AppError, AuthError};
use crate::models::user;
use crate::services::security::{decode_token, TokenType};
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Auth middleware that validates Bearer tokens
///
/// Returns 401 if the token is missing, invalid, expired or a refresh token.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => return AppError::from(AuthError::MissingToken).into_response(),
    };

    let user = match validate_token_and_get_user(&state, &token).await {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            return e.into_response();
        }
    };

    req.extensions_mut().insert(AuthenticatedUser(user));

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Validate an access token and fetch its user
async fn validate_token_and_get_user(state: &AppState, token: &str) -> Result<user::Model, AppError> {
    let claims = decode_token(token).map_err(|_| AuthError::InvalidToken)?;

    if claims.token_type == TokenType::Refresh {
        return Err(AuthError::RefreshTokenUsed.into());
    }

    user::Entity::find_by_id(claims.user)
        .one(&state.db)
        .await?
        .ok_or_else(|| AuthError::UnknownUser.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::models::user::UserRole;
    use crate::services::security::create_token;
    use crate::test_helpers::{create_test_db, create_test_user};

    async fn whoami(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
        user.username
    }

    async fn app() -> (Router, user::Model) {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let state = AppState::new(db);
        let router = Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(state, require_auth));
        (router, user)
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/me");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (app, _) = app().await;
        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_access_token_passes() {
        let (app, user) = app().await;
        let token = create_token(user.id, UserRole::User, TokenType::Access, 60).unwrap();
        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let (app, user) = app().await;
        let token = create_token(user.id, UserRole::User, TokenType::Refresh, 60).unwrap();
        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user_is_rejected() {
        let (app, _) = app().await;
        let token = create_token(9_999, UserRole::User, TokenType::Access, 60).unwrap();
        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
