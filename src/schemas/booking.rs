use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::booking::{self, BookingStatus};
use crate::models::payment::{self, PaymentStatus};
use crate::models::review;
use crate::schemas::event::EventResponse;
use crate::services::bookings::{BookingDetail, PaymentDetail, QuotePreview};
use crate::services::points::PointsQuote;
use crate::services::reviews::{ReviewListing, ReviewSubmission};

// ============================================================================
// Requests
// ============================================================================

/// `userId` is accepted for older clients and ignored; the token decides who books.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookEventRequest {
    #[serde(alias = "event_id")]
    pub event_id: i64,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(alias = "booking_id")]
    pub booking_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Every field is optional so missing ones surface as insufficient data.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[serde(default, alias = "payment_id")]
    pub payment_id: Option<i64>,
    #[serde(default, alias = "event_id")]
    pub event_id: Option<i64>,
    #[serde(default, alias = "review_text")]
    pub review_text: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl From<ReviewRequest> for ReviewSubmission {
    fn from(req: ReviewRequest) -> Self {
        Self {
            payment_id: req.payment_id,
            event_id: req.event_id,
            review_text: req.review_text,
            rating: req.rating,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    pub quantity: Option<i32>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub booking_id: i64,
    pub total_amount: i64,
    pub payment_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

impl From<payment::Model> for PaymentResponse {
    fn from(p: payment::Model) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            total_amount: p.total_amount,
            payment_date: p.payment_date,
            payment_status: p.payment_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub quantity: i32,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub points_used: i64,
    pub amount: i64,
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventResponse>,
    pub payments: Vec<PaymentResponse>,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            event_id: b.event_id,
            quantity: b.quantity,
            booking_date: b.booking_date,
            status: b.status,
            points_used: b.points_used,
            amount: b.amount,
            cancelled_at: b.cancelled_at,
            event: None,
            payments: Vec::new(),
        }
    }
}

impl From<BookingDetail> for BookingResponse {
    fn from(detail: BookingDetail) -> Self {
        Self {
            event: detail.event.map(EventResponse::from),
            payments: detail.payments.into_iter().map(PaymentResponse::from).collect(),
            ..BookingResponse::from(detail.booking)
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingCreatedResponse {
    pub booking: BookingResponse,
    pub quote: PointsQuote,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub payment: PaymentResponse,
    pub booking: BookingResponse,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentDetailResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub booking: BookingResponse,
    pub event: Option<EventResponse>,
}

impl From<PaymentDetail> for PaymentDetailResponse {
    fn from(detail: PaymentDetail) -> Self {
        Self {
            payment: detail.payment.into(),
            booking: detail.booking.into(),
            event: detail.event.map(EventResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub event_id: i64,
    pub quantity: i32,
    pub user_points: i64,
    pub quote: PointsQuote,
    /// Price after points, as shown on the booking page
    pub discounted_price: i64,
}

impl From<QuotePreview> for QuoteResponse {
    fn from(preview: QuotePreview) -> Self {
        Self {
            event_id: preview.event_id,
            quantity: preview.quantity,
            user_points: preview.user_points,
            discounted_price: preview.quote.final_amount,
            quote: preview.quote,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub payment_id: i64,
    pub review_text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<review::Model> for ReviewResponse {
    fn from(r: review::Model) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            user_id: r.user_id,
            payment_id: r.payment_id,
            review_text: r.review_text,
            rating: r.rating,
            created_at: r.created_at,
            event_name: None,
            username: None,
        }
    }
}

impl From<ReviewListing> for ReviewResponse {
    fn from(listing: ReviewListing) -> Self {
        Self {
            event_name: listing.event_name,
            username: listing.username,
            ..ReviewResponse::from(listing.review)
        }
    }
}
