use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::error::Result;
use crate::middleware::Authenticated;
use crate::schemas::{
    ApiResponse, BookEventRequest, BookingCreatedResponse, BookingResponse, PaymentDetailResponse,
    PurchaseRequest, PurchaseResponse, QuoteQuery, QuoteResponse, ReviewRequest, ReviewResponse,
};
use crate::services::{bookings, reviews};
use crate::state::AppState;

/// Booking, payment and review routes under `/api/user`
pub fn booking_routes(state: AppState) -> Router {
    Router::new()
        .route("/quote/{event_id}", get(quote_event))
        .route("/book-event", post(book_event_with_points))
        .route("/book-eventWihoutPoints", post(book_event_without_points))
        .route("/book-event/{booking_id}", delete(cancel_booking))
        .route("/purchase-event", post(purchase_event))
        .route("/payment/{payment_id}", get(get_payment))
        .route("/review", post(submit_review))
        .with_state(state)
}

// ============================================================================
// Booking
// ============================================================================

/// Preview the points discount for an event without booking it
#[utoipa::path(
    get,
    path = "/api/user/quote/{event_id}",
    tag = "Bookings",
    params(("event_id" = i64, Path, description = "Event id"), QuoteQuery),
    responses((status = 200, body = ApiResponse<QuoteResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn quote_event(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(event_id): Path<i64>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<ApiResponse<QuoteResponse>>> {
    let preview = bookings::quote_for_user(
        &state.db,
        &state.loyalty,
        user.id,
        event_id,
        query.quantity.unwrap_or(1),
    )
    .await?;

    Ok(Json(ApiResponse::new("Quote calculated", preview.into())))
}

/// Book an event, spending as many points as the price needs
#[utoipa::path(
    post,
    path = "/api/user/book-event",
    tag = "Bookings",
    request_body = BookEventRequest,
    responses(
        (status = 201, body = ApiResponse<BookingCreatedResponse>),
        (status = 409, description = "Event completed, already booked or sold out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn book_event_with_points(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<BookEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedResponse>>)> {
    book(state, auth, request, true).await
}

/// Book an event at full price, leaving the points balance alone
#[utoipa::path(
    post,
    path = "/api/user/book-eventWihoutPoints",
    tag = "Bookings",
    request_body = BookEventRequest,
    responses(
        (status = 201, body = ApiResponse<BookingCreatedResponse>),
        (status = 409, description = "Event completed, already booked or sold out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn book_event_without_points(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<BookEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedResponse>>)> {
    book(state, auth, request, false).await
}

async fn book(
    state: AppState,
    Authenticated(user): Authenticated,
    request: BookEventRequest,
    use_points: bool,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedResponse>>)> {
    if request.user_id.is_some_and(|id| id != user.id) {
        tracing::debug!(user_id = user.id, "Ignoring userId in booking request");
    }

    let outcome = bookings::book_event(
        &state.db,
        &state.loyalty,
        user.id,
        request.event_id,
        request.quantity.unwrap_or(1),
        use_points,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Event booked",
            BookingCreatedResponse {
                booking: outcome.booking.into(),
                quote: outcome.quote,
            },
        )),
    ))
}

/// Cancel an unpaid booking and refund its points
#[utoipa::path(
    delete,
    path = "/api/user/book-event/{booking_id}",
    tag = "Bookings",
    params(("booking_id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, body = ApiResponse<BookingResponse>),
        (status = 409, description = "Booking already paid or not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<BookingResponse>>> {
    let booking = bookings::cancel(&state.db, user.id, booking_id).await?;
    Ok(Json(ApiResponse::new("Booking cancelled", booking.into())))
}

// ============================================================================
// Payment
// ============================================================================

/// Pay for a pending booking
#[utoipa::path(
    post,
    path = "/api/user/purchase-event",
    tag = "Bookings",
    request_body = PurchaseRequest,
    responses(
        (status = 201, body = ApiResponse<PurchaseResponse>),
        (status = 409, description = "Booking is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchase_event(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PurchaseResponse>>)> {
    let outcome = bookings::purchase(&state.db, user.id, request.booking_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Payment successful",
            PurchaseResponse {
                payment: outcome.payment.into(),
                booking: outcome.booking.into(),
            },
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/payment/{payment_id}",
    tag = "Bookings",
    params(("payment_id" = i64, Path, description = "Payment id")),
    responses(
        (status = 200, body = ApiResponse<PaymentDetailResponse>),
        (status = 403, description = "Payment belongs to another user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(payment_id): Path<i64>,
) -> Result<Json<ApiResponse<PaymentDetailResponse>>> {
    let detail = bookings::payment_detail(&state.db, &user, payment_id).await?;
    Ok(Json(ApiResponse::new("Payment retrieved", detail.into())))
}

// ============================================================================
// Review
// ============================================================================

/// Review a paid booking once its event is Completed
#[utoipa::path(
    post,
    path = "/api/user/review",
    tag = "Bookings",
    request_body = ReviewRequest,
    responses(
        (status = 201, body = ApiResponse<ReviewResponse>),
        (status = 400, description = "Missing fields or rating out of range"),
        (status = 409, description = "Already reviewed or event not completed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_review(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(request): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>)> {
    let review = reviews::submit_review(&state.db, user.id, request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Review submitted", review.into())),
    ))
}
