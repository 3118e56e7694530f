//! Admin dashboard aggregates.

use std::collections::HashMap;

use chrono::{Datelike, TimeZone, Utc};
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::models::event::{self, EventType};
use crate::models::payment::{self, PaymentStatus};
use crate::models::user::{self, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyTotal {
    pub month: u32,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EventTypeCount {
    pub event_type: EventType,
    pub count: u64,
}

/// Paid totals for each month of `year`; always twelve entries.
///
/// Only the year's payments are fetched. Month bucketing stays in Rust because
/// date extraction differs between SQLite and Postgres.
pub async fn monthly_totals<C: ConnectionTrait>(db: &C, year: i32) -> Result<Vec<MonthlyTotal>> {
    let (Some(start), Some(end)) = (
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single(),
        Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single(),
    ) else {
        return Err(AppError::BadRequest(format!("Invalid year {}", year)));
    };

    let rows: Vec<(chrono::DateTime<Utc>, i64)> = payment::Entity::find()
        .select_only()
        .column(payment::Column::PaymentDate)
        .column(payment::Column::TotalAmount)
        .filter(payment::Column::PaymentStatus.eq(PaymentStatus::Paid))
        .filter(payment::Column::PaymentDate.gte(start))
        .filter(payment::Column::PaymentDate.lt(end))
        .into_tuple()
        .all(db)
        .await?;

    let mut totals = [0i64; 12];
    for (paid_at, amount) in rows {
        totals[paid_at.month0() as usize] += amount;
    }

    Ok(totals
        .iter()
        .enumerate()
        .map(|(i, total)| MonthlyTotal {
            month: i as u32 + 1,
            total_amount: *total,
        })
        .collect())
}

/// Events per type in one grouped query; types without events report zero.
pub async fn event_type_counts<C: ConnectionTrait>(db: &C) -> Result<Vec<EventTypeCount>> {
    let grouped: Vec<(EventType, i64)> = event::Entity::find()
        .select_only()
        .column(event::Column::EventType)
        .column_as(Expr::col(event::Column::Id).count(), "count")
        .group_by(event::Column::EventType)
        .into_tuple()
        .all(db)
        .await?;
    let counts: HashMap<EventType, i64> = grouped.into_iter().collect();

    Ok(EventType::iter()
        .map(|event_type| EventTypeCount {
            count: counts.get(&event_type).copied().unwrap_or(0).max(0) as u64,
            event_type,
        })
        .collect())
}

pub async fn total_paid_amount<C: ConnectionTrait>(db: &C) -> Result<i64> {
    // SUM over BIGINT is NUMERIC on Postgres
    let total: Option<Option<i64>> = payment::Entity::find()
        .select_only()
        .column_as(
            Expr::expr(Func::cast_as(
                Func::sum(Expr::col(payment::Column::TotalAmount)),
                Alias::new("BIGINT"),
            )),
            "total",
        )
        .filter(payment::Column::PaymentStatus.eq(PaymentStatus::Paid))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0))
}

/// Registered customers; admins are not counted.
pub async fn total_user_count<C: ConnectionTrait>(db: &C) -> Result<u64> {
    Ok(user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::User))
        .count(db)
        .await?)
}
