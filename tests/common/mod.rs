//! Test helpers shared by the integration tests.
//!
//! Provides an in-memory database, fixture builders and small request
//! helpers that drive the real router with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use artexpo::endpoints::create_router;
use artexpo::migrations::Migrator;
use artexpo::models::event::{self, EventType};
use artexpo::models::user::{self, UserRole};
use artexpo::services::security::{create_access_token, hash_password_with_cost};
use artexpo::state::AppState;

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

/// Build the full router over the given database
pub fn build_app(db: &DatabaseConnection) -> Router {
    create_router(AppState::new(db.clone()))
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
        // Minimum bcrypt cost keeps the suite fast
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

/// Create a regular user `<username>@example.com` with a points balance
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
        location: Set("Taman Ismail Marzuki".to_string()),
        description: Set(format!("{} description", name)),
        event_date: Set(now + chrono::Duration::days(14)),
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

pub async fn reload_user(db: &DatabaseConnection, user_id: i64) -> user::Model {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .expect("user exists")
}

pub fn bearer(user: &user::Model) -> String {
    format!("Bearer {}", create_access_token(user).unwrap())
}

// ============================================================================
// Request helpers
// ============================================================================

/// Send a request and return status plus parsed JSON body (`{}` when empty)
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));
    (status, json)
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, token, None).await
}

pub async fn post(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, token, Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, token, None).await
}
