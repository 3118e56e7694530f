use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::schemas::{
    ApiResponse, EventResponse, PageQuery, Paginated, ReviewResponse, SearchQuery,
    DEFAULT_PAGE_LIMIT, DEFAULT_REVIEW_LIMIT,
};
use crate::services::{events, reviews};
use crate::state::AppState;

/// Public catalog routes under `/api`
pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{event_id}", get(get_event))
        .route("/search", get(search_events))
        .route("/reviews", get(list_reviews))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    params(PageQuery),
    responses((status = 200, body = ApiResponse<Paginated<EventResponse>>))
)]
pub async fn list_events(
    State(state): State<AppState>,
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
    path = "/api/events/{event_id}",
    tag = "Events",
    params(("event_id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, body = ApiResponse<EventResponse>),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<EventResponse>>> {
    let event = events::get_event(&state.db, event_id).await?;
    Ok(Json(ApiResponse::new("Event retrieved", event.into())))
}

/// Search by text across name, location and description, optionally within a category
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "Events",
    params(SearchQuery),
    responses(
        (status = 200, body = ApiResponse<Vec<EventResponse>>),
        (status = 404, description = "No events found")
    )
)]
pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<EventResponse>>>> {
    let found =
        events::search_events(&state.db, query.term.as_deref(), query.category.as_deref()).await?;

    Ok(Json(ApiResponse::new(
        "Events found",
        found.into_iter().map(EventResponse::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Events",
    params(PageQuery),
    responses((status = 200, body = ApiResponse<Paginated<ReviewResponse>>))
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Paginated<ReviewResponse>>>> {
    let (page, limit) = query.resolve(DEFAULT_REVIEW_LIMIT);
    let (items, total) = reviews::list_reviews(&state.db, page, limit).await?;

    Ok(Json(ApiResponse::new(
        "Reviews retrieved",
        Paginated::new(
            items.into_iter().map(ReviewResponse::from).collect(),
            page,
            limit,
            total,
        ),
    )))
}
