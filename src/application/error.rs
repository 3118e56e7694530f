use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::SqlErr;
use serde::Serialize;
use thiserror::Error;

use crate::models::booking::BookingStatus;
use crate::services::booking_state::BookingTransition;

/// Authentication failures. Every variant maps to 401.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Refresh tokens cannot be used for API access")]
    RefreshTokenUsed,

    #[error("Access tokens cannot be used to refresh a session")]
    AccessTokenUsed,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UnknownUser,
}

/// Violations of the booking lifecycle rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingStateError {
    #[error("Cannot book an event that is marked as Completed")]
    EventCompleted,

    #[error("An event cannot be booked twice")]
    AlreadyBooked,

    #[error("Not enough tickets available")]
    SoldOut,

    #[error("A paid booking cannot be cancelled")]
    AlreadyPaid,

    #[error("Reviews are only accepted once the event is Completed")]
    EventNotCompleted,

    #[error("Cannot {transition} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        transition: BookingTransition,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Booking rejected: {0}")]
    BookingState(#[from] BookingStateError),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("A review for this payment already exists")]
    DuplicateReview,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Short machine-readable kind included in every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Auth(_) | AppError::Jwt(_) => "auth",
            AppError::Forbidden(_) => "forbidden",
            AppError::BookingState(_) => "booking_state",
            AppError::InsufficientData(_) => "insufficient_data",
            AppError::DuplicateReview => "duplicate_review",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) | AppError::Validation(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) | AppError::Database(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BookingState(_) | AppError::DuplicateReview | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::InsufficientData(_) | AppError::BadRequest(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the database rejected a write because of a unique index.
    pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Auth(e) => e.to_string(),
            AppError::BookingState(e) => e.to_string(),
            AppError::Forbidden(msg)
            | AppError::InsufficientData(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::DuplicateReview => self.to_string(),
            AppError::Validation(e) => format!("Invalid input: {}", e),
            AppError::Jwt(e) => {
                tracing::debug!("JWT rejected: {}", e);
                AuthError::InvalidToken.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
        };

        (
            status,
            Json(ErrorResponse {
                message,
                error: self.kind(),
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
