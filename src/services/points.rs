//! Loyalty points to discount conversion.
//!
//! One point is worth `point_value` Rupiah (1000 by default). A booking spends
//! at most as many points as are needed to cover the price, so a free booking
//! never burns more than `ceil(price / point_value)` points.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::loyalty::DEFAULT_POINT_VALUE;

/// Result of applying a user's points to a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PointsQuote {
    pub price: i64,
    pub points_used: i64,
    /// Money actually taken off; never more than `price`.
    pub discount: i64,
    pub final_amount: i64,
    pub points_remaining: i64,
}

impl PointsQuote {
    /// Quote that spends nothing, used for bookings made without points.
    pub fn without_points(user_points: i64, price: i64) -> Self {
        let price = price.max(0);
        Self {
            price,
            points_used: 0,
            discount: 0,
            final_amount: price,
            points_remaining: user_points.max(0),
        }
    }

    pub fn is_free(&self) -> bool {
        self.final_amount == 0
    }
}

/// Quote with the default point value.
pub fn quote(user_points: i64, price: i64) -> PointsQuote {
    quote_with_value(user_points, price, DEFAULT_POINT_VALUE)
}

pub fn quote_with_value(user_points: i64, price: i64, point_value: i64) -> PointsQuote {
    let user_points = user_points.max(0);
    let price = price.max(0);
    let point_value = point_value.max(1);

    let points_needed = if price == 0 {
        0
    } else {
        (price - 1) / point_value + 1
    };
    let points_used = user_points.min(points_needed);
    let covered = points_used.saturating_mul(point_value);

    PointsQuote {
        price,
        points_used,
        discount: covered.min(price),
        final_amount: price.saturating_sub(covered).max(0),
        points_remaining: user_points - points_used,
    }
}
