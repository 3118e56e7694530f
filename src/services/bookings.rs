//! Booking, purchase and cancellation.
//!
//! Every mutation here runs in a single transaction. Status changes are written
//! with a compare-and-set on the current status so two racing requests cannot
//! both move the same booking.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::config::loyalty::LoyaltyConfig;
use crate::error::{AppError, BookingStateError, Result};
use crate::models::booking::{self, BookingStatus};
use crate::models::payment::{self, PaymentStatus};
use crate::models::{event, user};
use crate::services::booking_state::BookingTransition;
use crate::services::points::{quote_with_value, PointsQuote};

#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub booking: booking::Model,
    pub quote: PointsQuote,
}

#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub booking: booking::Model,
    pub payment: payment::Model,
}

#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: booking::Model,
    pub event: Option<event::Model>,
    pub payments: Vec<payment::Model>,
}

#[derive(Debug, Clone)]
pub struct PaymentDetail {
    pub payment: payment::Model,
    pub booking: booking::Model,
    pub event: Option<event::Model>,
}

#[derive(Debug, Clone)]
pub struct QuotePreview {
    pub event_id: i64,
    pub quantity: i32,
    pub user_points: i64,
    pub quote: PointsQuote,
}

/// Book `quantity` tickets, optionally spending the user's points.
pub async fn book_event(
    db: &DatabaseConnection,
    loyalty: &LoyaltyConfig,
    user_id: i64,
    event_id: i64,
    quantity: i32,
    use_points: bool,
) -> Result<BookingOutcome> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let event = find_event(&txn, event_id).await?;
    if !event.event_type.is_bookable() {
        tracing::warn!(user_id, event_id, "Rejected booking for completed event");
        return Err(BookingStateError::EventCompleted.into());
    }

    if has_active_booking(&txn, user_id, event_id).await? {
        return Err(BookingStateError::AlreadyBooked.into());
    }

    if event.ticket_available < quantity {
        return Err(BookingStateError::SoldOut.into());
    }

    let user = user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let total = event.price.saturating_mul(i64::from(quantity));
    let quote = if use_points {
        quote_with_value(user.points, total, loyalty.point_value)
    } else {
        PointsQuote::without_points(user.points, total)
    };

    if quote.points_used > 0 {
        let spent = user::Entity::update_many()
            .col_expr(
                user::Column::Points,
                Expr::col(user::Column::Points).sub(quote.points_used),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::Points.gte(quote.points_used))
            .exec(&txn)
            .await?;
        if spent.rows_affected == 0 {
            return Err(AppError::Conflict(
                "Points balance changed, please retry".to_string(),
            ));
        }
    }

    let reserved = event::Entity::update_many()
        .col_expr(
            event::Column::TicketAvailable,
            Expr::col(event::Column::TicketAvailable).sub(quantity),
        )
        .filter(event::Column::Id.eq(event_id))
        .filter(event::Column::TicketAvailable.gte(quantity))
        .exec(&txn)
        .await?;
    if reserved.rows_affected == 0 {
        return Err(BookingStateError::SoldOut.into());
    }

    let booking = booking::ActiveModel {
        user_id: Set(user_id),
        event_id: Set(event_id),
        quantity: Set(quantity),
        booking_date: Set(chrono::Utc::now()),
        status: Set(BookingStatus::Pending),
        points_used: Set(quote.points_used),
        amount: Set(quote.final_amount),
        cancelled_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::from(BookingStateError::AlreadyBooked)
        } else {
            e.into()
        }
    })?;

    txn.commit().await?;

    tracing::info!(
        booking_id = booking.id,
        user_id,
        event_id,
        points_used = quote.points_used,
        amount = quote.final_amount,
        "Created booking"
    );

    Ok(BookingOutcome { booking, quote })
}

/// Pay for a pending booking and record the payment.
pub async fn purchase(
    db: &DatabaseConnection,
    user_id: i64,
    booking_id: i64,
) -> Result<PurchaseOutcome> {
    let txn = db.begin().await?;

    let current = find_owned_booking(&txn, user_id, booking_id).await?;
    let next = current.status.apply(BookingTransition::Pay)?;

    transition(&txn, &current, BookingTransition::Pay, next, None).await?;

    let payment = payment::ActiveModel {
        booking_id: Set(current.id),
        total_amount: Set(current.amount),
        payment_date: Set(chrono::Utc::now()),
        payment_status: Set(PaymentStatus::Paid),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let booking = reload(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(
        booking_id,
        payment_id = payment.id,
        total_amount = payment.total_amount,
        "Booking paid"
    );

    Ok(PurchaseOutcome { booking, payment })
}

/// Cancel an unpaid booking, refunding its points and releasing its tickets.
pub async fn cancel(
    db: &DatabaseConnection,
    user_id: i64,
    booking_id: i64,
) -> Result<booking::Model> {
    let txn = db.begin().await?;

    let current = find_owned_booking(&txn, user_id, booking_id).await?;

    let payments = payment::Entity::find()
        .filter(payment::Column::BookingId.eq(current.id))
        .count(&txn)
        .await?;
    if payments > 0 {
        tracing::warn!(booking_id, "Rejected cancellation of paid booking");
        return Err(BookingStateError::AlreadyPaid.into());
    }

    let next = current.status.apply(BookingTransition::Cancel)?;
    transition(
        &txn,
        &current,
        BookingTransition::Cancel,
        next,
        Some(chrono::Utc::now()),
    )
    .await?;

    if current.points_used > 0 {
        user::Entity::update_many()
            .col_expr(
                user::Column::Points,
                Expr::col(user::Column::Points).add(current.points_used),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(current.user_id))
            .exec(&txn)
            .await?;
    }

    event::Entity::update_many()
        .col_expr(
            event::Column::TicketAvailable,
            Expr::col(event::Column::TicketAvailable).add(current.quantity),
        )
        .filter(event::Column::Id.eq(current.event_id))
        .exec(&txn)
        .await?;

    let booking = reload(&txn, booking_id).await?;
    txn.commit().await?;

    tracing::info!(
        booking_id,
        refunded_points = current.points_used,
        "Booking cancelled"
    );

    Ok(booking)
}

/// Preview what booking `event_id` would cost the user with points applied.
pub async fn quote_for_user<C: ConnectionTrait>(
    db: &C,
    loyalty: &LoyaltyConfig,
    user_id: i64,
    event_id: i64,
    quantity: i32,
) -> Result<QuotePreview> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    let event = find_event(db, event_id).await?;
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let total = event.price.saturating_mul(i64::from(quantity));
    Ok(QuotePreview {
        event_id,
        quantity,
        user_points: user.points,
        quote: quote_with_value(user.points, total, loyalty.point_value),
    })
}

/// All bookings of a user, newest first, with their event and payments.
pub async fn bookings_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<Vec<BookingDetail>> {
    let rows = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .order_by_desc(booking::Column::BookingDate)
        .find_also_related(event::Entity)
        .all(db)
        .await?;

    let ids: Vec<i64> = rows.iter().map(|(b, _)| b.id).collect();
    let mut payments_by_booking: HashMap<i64, Vec<payment::Model>> = HashMap::new();
    if !ids.is_empty() {
        for p in payment::Entity::find()
            .filter(payment::Column::BookingId.is_in(ids))
            .order_by_asc(payment::Column::Id)
            .all(db)
            .await?
        {
            payments_by_booking.entry(p.booking_id).or_default().push(p);
        }
    }

    Ok(rows
        .into_iter()
        .map(|(booking, event)| BookingDetail {
            payments: payments_by_booking.remove(&booking.id).unwrap_or_default(),
            booking,
            event,
        })
        .collect())
}

/// A payment with its booking and event; visible to the booking owner and admins.
pub async fn payment_detail<C: ConnectionTrait>(
    db: &C,
    requester: &user::Model,
    payment_id: i64,
) -> Result<PaymentDetail> {
    let payment = payment::Entity::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    let booking = reload(db, payment.booking_id).await?;
    if booking.user_id != requester.id && !requester.is_admin() {
        return Err(AppError::Forbidden(
            "Payment belongs to another user".to_string(),
        ));
    }

    let event = event::Entity::find_by_id(booking.event_id).one(db).await?;

    Ok(PaymentDetail {
        payment,
        booking,
        event,
    })
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_event<C: ConnectionTrait>(db: &C, event_id: i64) -> Result<event::Model> {
    event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

async fn has_active_booking<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    event_id: i64,
) -> Result<bool> {
    let count = booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .filter(booking::Column::EventId.eq(event_id))
        .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Bookings of other users are reported as missing.
async fn find_owned_booking<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    booking_id: i64,
) -> Result<booking::Model> {
    booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

async fn reload<C: ConnectionTrait>(db: &C, booking_id: i64) -> Result<booking::Model> {
    booking::Entity::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

async fn transition<C: ConnectionTrait>(
    db: &C,
    current: &booking::Model,
    transition: BookingTransition,
    next: BookingStatus,
    cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<()> {
    let mut update = booking::Entity::update_many()
        .col_expr(booking::Column::Status, Expr::value(next))
        .filter(booking::Column::Id.eq(current.id))
        .filter(booking::Column::Status.eq(current.status));
    if let Some(at) = cancelled_at {
        update = update.col_expr(booking::Column::CancelledAt, Expr::value(at));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        return Err(BookingStateError::InvalidTransition {
            from: current.status,
            transition,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;
    use crate::test_helpers::{create_test_db, create_test_event, create_test_user};

    fn policy() -> LoyaltyConfig {
        LoyaltyConfig::default()
    }

    async fn points_of(db: &DatabaseConnection, user_id: i64) -> i64 {
        user::Entity::find_by_id(user_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .points
    }

    async fn tickets_of(db: &DatabaseConnection, event_id: i64) -> i32 {
        event::Entity::find_by_id(event_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .ticket_available
    }

    #[tokio::test]
    async fn test_book_with_points_deducts_balance() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 7).await;
        let event = create_test_event(&db, "Gallery Night", EventType::Exhibition, 10_000, 5).await;

        let outcome = book_event(&db, &policy(), user.id, event.id, 1, true)
            .await
            .unwrap();

        assert_eq!(outcome.booking.status, BookingStatus::Pending);
        assert_eq!(outcome.booking.points_used, 7);
        assert_eq!(outcome.booking.amount, 3_000);
        assert_eq!(points_of(&db, user.id).await, 0);
        assert_eq!(tickets_of(&db, event.id).await, 4);
    }

    #[tokio::test]
    async fn test_book_without_points_keeps_balance() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 7).await;
        let event = create_test_event(&db, "Gallery Night", EventType::Exhibition, 10_000, 5).await;

        let outcome = book_event(&db, &policy(), user.id, event.id, 2, false)
            .await
            .unwrap();

        assert_eq!(outcome.booking.points_used, 0);
        assert_eq!(outcome.booking.amount, 20_000);
        assert_eq!(points_of(&db, user.id).await, 7);
        assert_eq!(tickets_of(&db, event.id).await, 3);
    }

    #[tokio::test]
    async fn test_free_booking_leaves_leftover_points() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 10).await;
        let event = create_test_event(&db, "Street Fest", EventType::Festival, 5_000, 5).await;

        let outcome = book_event(&db, &policy(), user.id, event.id, 1, true)
            .await
            .unwrap();

        assert!(outcome.quote.is_free());
        assert_eq!(outcome.booking.amount, 0);
        assert_eq!(points_of(&db, user.id).await, 5);
    }

    #[tokio::test]
    async fn test_completed_event_cannot_be_booked() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Last Year", EventType::Completed, 1_000, 5).await;

        let err = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BookingState(BookingStateError::EventCompleted)
        ));
        assert_eq!(tickets_of(&db, event.id).await, 5);
    }

    #[tokio::test]
    async fn test_double_booking_is_rejected() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 3).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 2_000, 5).await;

        book_event(&db, &policy(), user.id, event.id, 1, true)
            .await
            .unwrap();
        let err = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::BookingState(BookingStateError::AlreadyBooked)
        ));
        // Second attempt must not touch points or tickets
        assert_eq!(points_of(&db, user.id).await, 1);
        assert_eq!(tickets_of(&db, event.id).await, 4);
    }

    #[tokio::test]
    async fn test_sold_out() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Tiny Show", EventType::Performing, 1_000, 1).await;

        let err = book_event(&db, &policy(), user.id, event.id, 2, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BookingState(BookingStateError::SoldOut)
        ));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_bad_request() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 2_000, 5).await;

        let err = book_event(&db, &policy(), user.id, event.id, 0, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_cancel_refunds_points_and_tickets() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 4).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 10_000, 5).await;

        let booked = book_event(&db, &policy(), user.id, event.id, 1, true)
            .await
            .unwrap();
        assert_eq!(points_of(&db, user.id).await, 0);

        let cancelled = cancel(&db, user.id, booked.booking.id).await.unwrap();

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(points_of(&db, user.id).await, 4);
        assert_eq!(tickets_of(&db, event.id).await, 5);
    }

    #[tokio::test]
    async fn test_rebook_after_cancel() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 1_000, 5).await;

        let first = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap();
        cancel(&db, user.id, first.booking.id).await.unwrap();

        let second = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap();
        assert_ne!(first.booking.id, second.booking.id);
    }

    #[tokio::test]
    async fn test_paid_booking_cannot_be_cancelled() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 2).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;

        let booked = book_event(&db, &policy(), user.id, event.id, 1, true)
            .await
            .unwrap();
        let paid = purchase(&db, user.id, booked.booking.id).await.unwrap();
        assert_eq!(paid.booking.status, BookingStatus::Completed);
        assert_eq!(paid.payment.total_amount, 3_000);
        assert_eq!(paid.payment.payment_status, PaymentStatus::Paid);

        let err = cancel(&db, user.id, booked.booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::BookingState(BookingStateError::AlreadyPaid)
        ));
        assert_eq!(points_of(&db, user.id).await, 0);
    }

    #[tokio::test]
    async fn test_cannot_pay_twice() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;

        let booked = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap();
        purchase(&db, user.id, booked.booking.id).await.unwrap();

        let err = purchase(&db, user.id, booked.booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::BookingState(BookingStateError::InvalidTransition {
                from: BookingStatus::Completed,
                transition: BookingTransition::Pay,
            })
        ));
    }

    #[tokio::test]
    async fn test_cannot_pay_cancelled_booking() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;

        let booked = book_event(&db, &policy(), user.id, event.id, 1, false)
            .await
            .unwrap();
        cancel(&db, user.id, booked.booking.id).await.unwrap();

        let err = purchase(&db, user.id, booked.booking.id).await.unwrap_err();
        assert!(matches!(err, AppError::BookingState(_)));
        let payments = payment::Entity::find().count(&db).await.unwrap();
        assert_eq!(payments, 0);
    }

    #[tokio::test]
    async fn test_other_users_booking_is_not_found() {
        let db = create_test_db().await;
        let owner = create_test_user(&db, "alice", 0).await;
        let other = create_test_user(&db, "mallory", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;

        let booked = book_event(&db, &policy(), owner.id, event.id, 1, false)
            .await
            .unwrap();

        assert!(matches!(
            cancel(&db, other.id, booked.booking.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            purchase(&db, other.id, booked.booking.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_quote_for_user_multiplies_quantity() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 5).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 3_000, 5).await;

        let preview = quote_for_user(&db, &policy(), user.id, event.id, 2)
            .await
            .unwrap();
        assert_eq!(preview.quote.price, 6_000);
        assert_eq!(preview.quote.points_used, 5);
        assert_eq!(preview.quote.final_amount, 1_000);
        // Preview never spends
        assert_eq!(points_of(&db, user.id).await, 5);
    }

    #[tokio::test]
    async fn test_bookings_for_user_include_payments() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let opera = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;
        let fest = create_test_event(&db, "Fest", EventType::Festival, 1_000, 5).await;

        let a = book_event(&db, &policy(), user.id, opera.id, 1, false)
            .await
            .unwrap();
        book_event(&db, &policy(), user.id, fest.id, 1, false)
            .await
            .unwrap();
        purchase(&db, user.id, a.booking.id).await.unwrap();

        let list = bookings_for_user(&db, user.id).await.unwrap();
        assert_eq!(list.len(), 2);
        let paid = list.iter().find(|d| d.booking.id == a.booking.id).unwrap();
        assert_eq!(paid.payments.len(), 1);
        assert_eq!(paid.event.as_ref().unwrap().event_name, "Opera");
    }

    #[tokio::test]
    async fn test_payment_detail_visibility() {
        let db = create_test_db().await;
        let owner = create_test_user(&db, "alice", 0).await;
        let other = create_test_user(&db, "mallory", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 5_000, 5).await;

        let booked = book_event(&db, &policy(), owner.id, event.id, 1, false)
            .await
            .unwrap();
        let paid = purchase(&db, owner.id, booked.booking.id).await.unwrap();

        let detail = payment_detail(&db, &owner, paid.payment.id).await.unwrap();
        assert_eq!(detail.booking.id, booked.booking.id);

        assert!(matches!(
            payment_detail(&db, &other, paid.payment.id).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
