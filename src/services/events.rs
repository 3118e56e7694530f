//! Event catalog: admin maintenance plus public listing and search.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::error::{AppError, Result};
use crate::models::booking::{self, BookingStatus};
use crate::models::event::{self, EventType};

#[derive(Debug, Clone)]
pub struct EventInput {
    pub event_name: String,
    pub location: String,
    pub description: String,
    pub event_date: chrono::DateTime<chrono::Utc>,
    pub event_type: EventType,
    pub ticket_available: i32,
    pub price: i64,
    pub image: Option<String>,
}

impl EventInput {
    fn check(&self) -> Result<()> {
        if self.event_name.trim().is_empty() {
            return Err(AppError::BadRequest("event_name is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::BadRequest("location is required".to_string()));
        }
        if self.price < 0 {
            return Err(AppError::BadRequest("price cannot be negative".to_string()));
        }
        if self.ticket_available < 0 {
            return Err(AppError::BadRequest(
                "ticket_available cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn create_event<C: ConnectionTrait>(db: &C, input: EventInput) -> Result<event::Model> {
    input.check()?;
    let now = chrono::Utc::now();

    let created = event::ActiveModel {
        event_name: Set(input.event_name.trim().to_string()),
        location: Set(input.location.trim().to_string()),
        description: Set(input.description),
        event_date: Set(input.event_date),
        event_type: Set(input.event_type),
        ticket_available: Set(input.ticket_available),
        price: Set(input.price),
        image: Set(input.image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(event_id = created.id, "Created event {}", created.event_name);
    Ok(created)
}

pub async fn update_event<C: ConnectionTrait>(
    db: &C,
    event_id: i64,
    input: EventInput,
) -> Result<event::Model> {
    input.check()?;
    let existing = get_event(db, event_id).await?;

    let mut model: event::ActiveModel = existing.into();
    model.event_name = Set(input.event_name.trim().to_string());
    model.location = Set(input.location.trim().to_string());
    model.description = Set(input.description);
    model.event_date = Set(input.event_date);
    model.event_type = Set(input.event_type);
    model.ticket_available = Set(input.ticket_available);
    model.price = Set(input.price);
    model.image = Set(input.image);
    model.updated_at = Set(chrono::Utc::now());

    let updated = model.update(db).await?;
    tracing::info!(event_id, "Updated event");
    Ok(updated)
}

/// Delete an event nobody holds an active booking for.
///
/// Cancelled bookings are history only and go with the event.
pub async fn delete_event(db: &DatabaseConnection, event_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    get_event(&txn, event_id).await?;

    let active = booking::Entity::find()
        .filter(booking::Column::EventId.eq(event_id))
        .filter(booking::Column::Status.ne(BookingStatus::Cancelled))
        .count(&txn)
        .await?;
    if active > 0 {
        return Err(AppError::Conflict(format!(
            "Event has {} active booking(s)",
            active
        )));
    }

    booking::Entity::delete_many()
        .filter(booking::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    event::Entity::delete_by_id(event_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(event_id, "Deleted event");
    Ok(())
}

pub async fn get_event<C: ConnectionTrait>(db: &C, event_id: i64) -> Result<event::Model> {
    event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

/// One page of events by date, plus the total count.
pub async fn list_events<C: ConnectionTrait>(
    db: &C,
    page: u64,
    limit: u64,
) -> Result<(Vec<event::Model>, u64)> {
    let total = event::Entity::find().count(db).await?;
    let items = event::Entity::find()
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .offset(page.max(1).saturating_sub(1).saturating_mul(limit))
        .limit(limit)
        .all(db)
        .await?;
    Ok((items, total))
}

/// Search by free text and/or category. An empty result is `NotFound`.
pub async fn search_events<C: ConnectionTrait>(
    db: &C,
    term: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<event::Model>> {
    let mut condition = Condition::all();

    if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(lower(event::Column::EventName).like(pattern.clone()))
                .add(lower(event::Column::Location).like(pattern.clone()))
                .add(lower(event::Column::Description).like(pattern)),
        );
    }

    if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
        match EventType::parse(category) {
            Some(ty) => condition = condition.add(event::Column::EventType.eq(ty)),
            None => {
                tracing::debug!("Unknown event category {}", category);
                return Err(AppError::NotFound("No events found".to_string()));
            }
        }
    }

    let found = event::Entity::find()
        .filter(condition)
        .order_by_asc(event::Column::EventDate)
        .all(db)
        .await?;

    if found.is_empty() {
        return Err(AppError::NotFound("No events found".to_string()));
    }
    Ok(found)
}

fn lower(column: event::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loyalty::LoyaltyConfig;
    use crate::services::bookings;
    use crate::test_helpers::{create_test_db, create_test_event, create_test_user};

    fn input(name: &str) -> EventInput {
        EventInput {
            event_name: name.to_string(),
            location: "Jakarta".to_string(),
            description: "Contemporary works".to_string(),
            event_date: chrono::Utc::now(),
            event_type: EventType::Exhibition,
            ticket_available: 50,
            price: 75_000,
            image: Some("https://cdn.example.com/a.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let db = create_test_db().await;
        let created = create_event(&db, input("Batik Today")).await.unwrap();
        assert_eq!(created.price, 75_000);

        let mut changed = input("Batik Tomorrow");
        changed.event_type = EventType::Completed;
        let updated = update_event(&db, created.id, changed).await.unwrap();
        assert_eq!(updated.event_name, "Batik Tomorrow");
        assert_eq!(updated.event_type, EventType::Completed);
    }

    #[tokio::test]
    async fn test_rejects_invalid_input() {
        let db = create_test_db().await;

        let mut bad = input(" ");
        assert!(matches!(create_event(&db, bad.clone()).await, Err(AppError::BadRequest(_))));

        bad = input("ok");
        bad.price = -1;
        assert!(matches!(create_event(&db, bad).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_missing_event() {
        let db = create_test_db().await;
        assert!(matches!(
            update_event(&db, 999, input("x")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_with_active_booking_conflicts() {
        let db = create_test_db().await;
        let user = create_test_user(&db, "alice", 0).await;
        let event = create_test_event(&db, "Opera", EventType::Theater, 1_000, 5).await;
        let booked = bookings::book_event(&db, &LoyaltyConfig::default(), user.id, event.id, 1, false)
            .await
            .unwrap();

        assert!(matches!(
            delete_event(&db, event.id).await,
            Err(AppError::Conflict(_))
        ));

        bookings::cancel(&db, user.id, booked.booking.id).await.unwrap();
        delete_event(&db, event.id).await.unwrap();
        assert!(matches!(get_event(&db, event.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let db = create_test_db().await;
        for i in 0..8 {
            create_test_event(&db, &format!("Event {}", i), EventType::Festival, 1_000, 5).await;
        }

        let (first, total) = list_events(&db, 1, 6).await.unwrap();
        let (second, _) = list_events(&db, 2, 6).await.unwrap();
        assert_eq!(total, 8);
        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 2);

        let (beyond, total) = list_events(&db, 1_000_000, 100).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(total, 8);
    }

    #[tokio::test]
    async fn test_search_by_term_and_category() {
        let db = create_test_db().await;
        create_test_event(&db, "Wayang Night", EventType::Theater, 1_000, 5).await;
        create_test_event(&db, "Jazz Festival", EventType::Festival, 1_000, 5).await;

        let found = search_events(&db, Some("WAYANG"), None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event_name, "Wayang Night");

        let found = search_events(&db, None, Some("festival")).await.unwrap();
        assert_eq!(found.len(), 1);

        assert!(matches!(
            search_events(&db, Some("wayang"), Some("Festival")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            search_events(&db, Some("nothing here"), None).await,
            Err(AppError::NotFound(_))
        ));
    }
}
