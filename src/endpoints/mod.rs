pub mod admin;
pub mod auth;
pub mod bookings;
pub mod events;
pub mod users;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::config::CONFIG;
use crate::error::AppError;
use crate::middleware::{require_auth, security_headers};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "ArtExpo API", description = "Event booking with loyalty points"),
    paths(
        auth::login,
        auth::refresh_token,
        users::register,
        users::get_profile,
        users::get_booked_events,
        events::list_events,
        events::get_event,
        events::search_events,
        events::list_reviews,
        bookings::quote_event,
        bookings::book_event_with_points,
        bookings::book_event_without_points,
        bookings::cancel_booking,
        bookings::purchase_event,
        bookings::get_payment,
        bookings::submit_review,
        admin::list_events,
        admin::get_event,
        admin::create_event,
        admin::update_event,
        admin::delete_event,
        admin::monthly_statistics,
        admin::event_type_count,
        admin::total_paid_amount,
        admin::total_user_count,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Login and token refresh"),
        (name = "Users", description = "Registration and profiles"),
        (name = "Events", description = "Public catalog"),
        (name = "Bookings", description = "Booking lifecycle, payments and reviews"),
        (name = "Admin", description = "Event maintenance and statistics")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(get_version))
        .route("/api/openapi.json", get(openapi_json))
        .nest("/api/auth", auth::auth_routes(state.clone()))
        .nest("/api", events::catalog_routes(state.clone()))
        .merge(users::registration_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest(
            "/api/user",
            users::user_routes(state.clone()).merge(bookings::booking_routes(state.clone())),
        )
        .nest("/api/admin", admin::admin_routes(state.clone()))
        .route_layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes
        .merge(protected_routes)
        .fallback(not_found)
        .layer(axum_middleware::from_fn(security_headers))
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
    }))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
