//! Role-based authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! async fn delete_event(
//!     Authorized(admin, _): Authorized<AdminRole>,
//!     Path(id): Path<i64>,
//! ) -> Result<Json<...>> {
//!     // role already verified
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::models::user::{self, UserRole};

/// Marker for a role a route requires
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: UserRole;
}

#[derive(Debug, Clone, Copy)]
pub struct AdminRole;

impl RequiredRole for AdminRole {
    const ROLE: UserRole = UserRole::Admin;
}

/// Extractor that requires the authenticated user to hold role `R`.
///
/// Returns 403 when the user is authenticated but lacks the role.
#[derive(Debug, Clone)]
pub struct Authorized<R: RequiredRole>(pub user::Model, pub PhantomData<R>);

impl<R: RequiredRole> Authorized<R> {
    pub fn user(&self) -> &user::Model {
        &self.0
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;

        if user.role != R::ROLE {
            tracing::warn!(user_id = user.id, "Denied {} route to {}", R::ROLE, user.role);
            return Err(AppError::Forbidden(format!("{} role required", R::ROLE)));
        }

        Ok(Authorized(user, PhantomData))
    }
}

/// Extractor for any authenticated user
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl Authenticated {
    /// Admins may act on any user's resources; everyone else only on their own.
    pub fn ensure_self_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.0.id == user_id || self.0.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot access another user's data".to_string(),
            ))
        }
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AuthError::MissingToken)?;

        Ok(Authenticated(auth_user.0.clone()))
    }
}
