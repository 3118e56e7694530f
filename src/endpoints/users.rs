use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use sea_orm::EntityTrait;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::Authenticated;
use crate::models::user;
use crate::schemas::{
    ApiResponse, BookingResponse, ProfileResponse, ReferralCodeResponse, RegisterRequest,
    RegisterResponse,
};
use crate::services::{bookings, referral};
use crate::state::AppState;

/// Public registration, mounted at `/api/users`
pub fn registration_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/users", axum::routing::post(register))
        .with_state(state)
}

/// Authenticated profile routes under `/api/user`
pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/{user_id}", get(get_profile))
        .route("/booked-events/{user_id}", get(get_booked_events))
        .with_state(state)
}

/// Register a new account, optionally with someone's referral code
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, body = ApiResponse<RegisterResponse>),
        (status = 400, description = "Invalid input or referral code"),
        (status = 409, description = "Email or username taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    request.validate()?;

    let registration = referral::register(
        &state.db,
        &state.loyalty,
        referral::NewUser {
            username: request.username,
            email: request.email,
            password: request.password,
            referral_code: request.referral_code,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "User registered",
            RegisterResponse {
                user: registration.user.into(),
                referral_code: registration.referral_code.into(),
            },
        )),
    ))
}

/// Profile with points balance, referral codes and bookings
#[utoipa::path(
    get,
    path = "/api/user/{user_id}",
    tag = "Users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = ApiResponse<ProfileResponse>),
        (status = 403, description = "Not your profile")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<ProfileResponse>>> {
    auth.ensure_self_or_admin(user_id)?;

    let found = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let referral_codes = referral::codes_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(ReferralCodeResponse::from)
        .collect();
    let bookings = bookings::bookings_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(
        "User retrieved",
        ProfileResponse {
            user: found.into(),
            referral_codes,
            bookings,
        },
    )))
}

/// Bookings of a user, newest first
#[utoipa::path(
    get,
    path = "/api/user/booked-events/{user_id}",
    tag = "Users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = ApiResponse<Vec<BookingResponse>>),
        (status = 403, description = "Not your bookings")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_booked_events(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>> {
    auth.ensure_self_or_admin(user_id)?;

    let bookings = bookings::bookings_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(BookingResponse::from)
        .collect();

    Ok(Json(ApiResponse::new("Booked events retrieved", bookings)))
}
