//! Test helpers for unit tests inside the crate.
//!
//! Every database is a fresh in-memory SQLite migrated with the real `Migrator`.

use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use crate::migrations::Migrator;
use crate::models::event::{self, EventType};
use crate::models::user::{self, UserRole};
use crate::services::security::hash_password_with_cost;

pub const TEST_PASSWORD: &str = "password123";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

async fn insert_user(
    db: &DatabaseConnection,
    username: &str,
    role: UserRole,
    points: i64,
) -> user::Model {
    let now = chrono::Utc::now();
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        hashed_password: Set(hash_password_with_cost(TEST_PASSWORD, 4).unwrap()),
        role: Set(role),
        points: Set(points),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test user")
}

/// Regular user `<username>@example.com` with the given points balance
pub async fn create_test_user(db: &DatabaseConnection, username: &str, points: i64) -> user::Model {
    insert_user(db, username, UserRole::User, points).await
}

pub async fn create_test_admin(db: &DatabaseConnection, username: &str) -> user::Model {
    insert_user(db, username, UserRole::Admin, 0).await
}

pub async fn create_test_event(
    db: &DatabaseConnection,
    name: &str,
    event_type: EventType,
    price: i64,
    tickets: i32,
) -> event::Model {
    let now = chrono::Utc::now();
    event::ActiveModel {
        event_name: Set(name.to_string()),
        location: Set("Jakarta Convention Center".to_string()),
        description: Set(format!("{} description", name)),
        event_date: Set(now + chrono::Duration::days(30)),
        event_type: Set(event_type),
        ticket_available: Set(tickets),
        price: Set(price),
        image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create test event")
}

/// Flip an event's type, e.g. to mark it Completed after a booking was paid
pub async fn set_event_type(db: &DatabaseConnection, event_id: i64, event_type: EventType) {
    let found = event::Entity::find_by_id(event_id)
        .one(db)
        .await
        .unwrap()
        .expect("event exists");
    let mut model: event::ActiveModel = found.into();
    model.event_type = Set(event_type);
    model.update(db).await.unwrap();
}
