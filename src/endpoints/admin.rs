use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Datelike;
use validator::Validate;

use crate::error::Result;
use crate::middleware::{AdminRole, Authorized};
use crate::schemas::{
    ApiResponse, EventRequest, EventResponse, PageQuery, Paginated, TotalPaidAmount, UserCount,
    YearQuery, DEFAULT_PAGE_LIMIT,
};
use crate::services::events;
use crate::services::statistics::{self, EventTypeCount, MonthlyTotal};
use crate::state::AppState;

/// Admin-only routes under `/api/admin`
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/statistics/monthly", get(monthly_statistics))
        .route("/statistics/eventTypeCount", get(event_type_count))
        .route("/statistics/totalPaidAmount", get(total_paid_amount))
        .route("/statistics/totalUserCount", get(total_user_count))
        .with_state(state)
}

// ============================================================================
// Events
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/events",
    tag = "Admin",
    params(PageQuery),
    responses((status = 200, body = ApiResponse<Paginated<EventResponse>>)),
    security(("bearer_auth" = []))
)]
pub async fn list_events(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<EventResponse>>>> {
    let (page, limit) = query.resolve(DEFAULT_PAGE_LIMIT);
    let (items, total) = events::list_events(&state.db, page, limit).await?;

    Ok(Json(ApiResponse::new(
        "Events retrieved",
        Paginated::new(
            items.into_iter().map(EventResponse::from).collect(),
            page,
            limit,
            total,
        ),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/events/{event_id}",
    tag = "Admin",
    params(("event_id" = i64, Path, description = "Event id")),
    responses((status = 200, body = ApiResponse<EventResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn get_event(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<EventResponse>>> {
    let event = events::get_event(&state.db, event_id).await?;
    Ok(Json(ApiResponse::new("Event retrieved", event.into())))
}

#[utoipa::path(
    post,
    path = "/api/admin/events",
    tag = "Admin",
    request_body = EventRequest,
    responses(
        (status = 201, body = ApiResponse<EventResponse>),
        (status = 400, description = "Invalid event")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventResponse>>)> {
    request.validate()?;
    let event = events::create_event(&state.db, request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Event created", event.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/events/{event_id}",
    tag = "Admin",
    params(("event_id" = i64, Path, description = "Event id")),
    request_body = EventRequest,
    responses((status = 200, body = ApiResponse<EventResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn update_event(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
    Path(event_id): Path<i64>,
    Json(request): Json<EventRequest>,
) -> Result<Json<ApiResponse<EventResponse>>> {
    request.validate()?;
    let event = events::update_event(&state.db, event_id, request.into()).await?;
    Ok(Json(ApiResponse::new("Event updated", event.into())))
}

#[utoipa::path(
    delete,
    path = "/api/admin/events/{event_id}",
    tag = "Admin",
    params(("event_id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 409, description = "Event has active bookings")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminRole>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<i64>>> {
    events::delete_event(&state.db, event_id).await?;
    tracing::info!(admin_id = admin.id, event_id, "Event removed by admin");
    Ok(Json(ApiResponse::new("Event deleted", event_id)))
}

// ============================================================================
// Statistics
// ============================================================================

/// Paid totals per month; defaults to the current year
#[utoipa::path(
    get,
    path = "/api/admin/statistics/monthly",
    tag = "Admin",
    params(YearQuery),
    responses((status = 200, body = ApiResponse<Vec<MonthlyTotal>>)),
    security(("bearer_auth" = []))
)]
pub async fn monthly_statistics(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
    Query(query): Query<YearQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlyTotal>>>> {
    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());
    let totals = statistics::monthly_totals(&state.db, year).await?;
    Ok(Json(ApiResponse::new("Monthly statistics", totals)))
}

#[utoipa::path(
    get,
    path = "/api/admin/statistics/eventTypeCount",
    tag = "Admin",
    responses((status = 200, body = ApiResponse<Vec<EventTypeCount>>)),
    security(("bearer_auth" = []))
)]
pub async fn event_type_count(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
) -> Result<Json<ApiResponse<Vec<EventTypeCount>>>> {
    let counts = statistics::event_type_counts(&state.db).await?;
    Ok(Json(ApiResponse::new("Event type count", counts)))
}

#[utoipa::path(
    get,
    path = "/api/admin/statistics/totalPaidAmount",
    tag = "Admin",
    responses((status = 200, body = ApiResponse<TotalPaidAmount>)),
    security(("bearer_auth" = []))
)]
pub async fn total_paid_amount(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
) -> Result<Json<ApiResponse<TotalPaidAmount>>> {
    let total = statistics::total_paid_amount(&state.db).await?;
    Ok(Json(ApiResponse::new(
        "Total paid amount",
        TotalPaidAmount {
            total_paid_amount: total,
        },
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/statistics/totalUserCount",
    tag = "Admin",
    responses((status = 200, body = ApiResponse<UserCount>)),
    security(("bearer_auth" = []))
)]
pub async fn total_user_count(
    State(state): State<AppState>,
    _auth: Authorized<AdminRole>,
) -> Result<Json<ApiResponse<UserCount>>> {
    let count = statistics::total_user_count(&state.db).await?;
    Ok(Json(ApiResponse::new(
        "Total user count",
        UserCount { user_count: count },
    )))
}
