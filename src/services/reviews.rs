//! Review gate: one review per (user, payment), only for finished events.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::error::{AppError, BookingStateError, Result};
use crate::models::event::EventType;
use crate::models::{booking, event, payment, review, user};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Raw review submission; every field may be missing.
#[derive(Debug, Clone, Default)]
pub struct ReviewSubmission {
    pub payment_id: Option<i64>,
    pub event_id: Option<i64>,
    pub review_text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ReviewListing {
    pub review: review::Model,
    pub event_name: Option<String>,
    pub username: Option<String>,
}

pub async fn submit_review<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    submission: ReviewSubmission,
) -> Result<review::Model> {
    let (payment_id, event_id, text, rating) = match submission {
        ReviewSubmission {
            payment_id: Some(p),
            event_id: Some(e),
            review_text: Some(t),
            rating: Some(r),
        } if !t.trim().is_empty() => (p, e, t.trim().to_string(), r),
        _ => {
            return Err(AppError::InsufficientData(
                "paymentId, eventId, reviewText and rating are required".to_string(),
            ))
        }
    };

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InsufficientData(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }

    let (payment, booking) = payment::Entity::find_by_id(payment_id)
        .find_also_related(booking::Entity)
        .one(db)
        .await?
        .and_then(|(p, b)| b.map(|b| (p, b)))
        .filter(|(_, b)| b.user_id == user_id)
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    if booking.event_id != event_id {
        return Err(AppError::InsufficientData(
            "Payment does not belong to this event".to_string(),
        ));
    }

    let event = event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    if event.event_type != EventType::Completed {
        return Err(BookingStateError::EventNotCompleted.into());
    }

    let existing = review::Entity::find()
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::PaymentId.eq(payment.id))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(AppError::DuplicateReview);
    }

    let created = review::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(user_id),
        payment_id: Set(payment.id),
        review_text: Set(text),
        rating: Set(rating),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::DuplicateReview
        } else {
            e.into()
        }
    })?;

    tracing::info!(
        review_id = created.id,
        user_id,
        event_id,
        rating,
        "Review submitted"
    );
    Ok(created)
}

/// Newest reviews first, with event name and author.
pub async fn list_reviews<C: ConnectionTrait>(
    db: &C,
    page: u64,
    limit: u64,
) -> Result<(Vec<ReviewListing>, u64)> {
    let total = review::Entity::find().count(db).await?;

    let rows = review::Entity::find()
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .offset(page.max(1).saturating_sub(1).saturating_mul(limit))
        .limit(limit)
        .find_also_related(event::Entity)
        .all(db)
        .await?;

    let user_ids: Vec<i64> = rows.iter().map(|(r, _)| r.user_id).collect();
    let usernames: HashMap<i64, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };

    let listings = rows
        .into_iter()
        .map(|(review, event)| ReviewListing {
            username: usernames.get(&review.user_id).cloned(),
            event_name: event.map(|e| e.event_name),
            review,
        })
        .collect();

    Ok((listings, total))
}
