//! Admin endpoint integration tests
//!
//! Event maintenance and dashboard statistics, plus role enforcement.

use axum::http::StatusCode;
use chrono::Datelike;
use serde_json::json;

mod common;
use common::{
    bearer, build_app, create_test_admin, create_test_db, create_test_event, create_test_user,
    delete, get, post, send,
};

use artexpo::models::event::EventType;

fn event_payload(name: &str) -> serde_json::Value {
    json!({
        "event_name": name,
        "location": "Galeri Nasional",
        "description": "Modern Indonesian painting",
        "event_date": "2026-12-01T19:00:00Z",
        "event_type": "Exhibition",
        "ticket_available": 120,
        "price": 50000,
        "image": "https://cdn.example.com/poster.jpg",
    })
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn test_regular_user_is_forbidden() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "ayu", 0).await;
    let token = bearer(&user);

    let (status, body) = post(
        build_app(&db),
        "/api/admin/events",
        Some(&token),
        event_payload("Nope"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = get(build_app(&db), "/api/admin/statistics/totalUserCount", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let db = create_test_db().await;

    let (status, _) = get(build_app(&db), "/api/admin/events", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Events CRUD
// ============================================================================

#[tokio::test]
async fn test_event_crud() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root").await;
    let token = bearer(&admin);

    let (status, created) = post(
        build_app(&db),
        "/api/admin/events",
        Some(&token),
        event_payload("Affandi Revisited"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["event_type"], "Exhibition");
    assert_eq!(created["data"]["discounted_price"], 50000);
    let id = created["data"]["id"].as_i64().unwrap();

    let mut changed = event_payload("Affandi Revisited");
    changed["event_type"] = json!("Completed");
    changed["price"] = json!(0);
    let (status, updated) = send(
        build_app(&db),
        "PUT",
        &format!("/api/admin/events/{}", id),
        Some(&token),
        Some(changed),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["event_type"], "Completed");
    assert_eq!(updated["data"]["price"], 0);

    let (status, fetched) = get(build_app(&db), &format!("/api/admin/events/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["event_name"], "Affandi Revisited");

    let (status, _) = delete(build_app(&db), &format!("/api/admin/events/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(build_app(&db), &format!("/api/events/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_event_rejects_invalid_payload() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root").await;

    let mut bad = event_payload("");
    bad["price"] = json!(-5);
    let (status, _) = post(build_app(&db), "/api/admin/events", Some(&bearer(&admin)), bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_event_with_active_booking_conflicts() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root").await;
    let user = create_test_user(&db, "ayu", 0).await;
    let event = create_test_event(&db, "Opera", EventType::Theater, 1_000, 5).await;

    post(
        build_app(&db),
        "/api/user/book-event",
        Some(&bearer(&user)),
        json!({"eventId": event.id}),
    )
    .await;

    let (status, _) = delete(
        build_app(&db),
        &format!("/api/admin/events/{}", event.id),
        Some(&bearer(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_statistics() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "root").await;
    let token = bearer(&admin);
    create_test_event(&db, "Finished Show", EventType::Completed, 1_000, 5).await;
    let event = create_test_event(&db, "Opera", EventType::Theater, 6_000, 5).await;

    for name in ["ayu", "budi"] {
        let user = create_test_user(&db, name, 0).await;
        let user_token = bearer(&user);
        let (_, booked) = post(
            build_app(&db),
            "/api/user/book-event",
            Some(&user_token),
            json!({"eventId": event.id}),
        )
        .await;
        post(
            build_app(&db),
            "/api/user/purchase-event",
            Some(&user_token),
            json!({"bookingId": booked["data"]["booking"]["id"]}),
        )
        .await;
    }

    let (status, body) = get(build_app(&db), "/api/admin/statistics/totalPaidAmount", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalPaidAmount"], 12_000);

    let (_, body) = get(build_app(&db), "/api/admin/statistics/totalUserCount", Some(&token)).await;
    assert_eq!(body["data"]["userCount"], 2);

    let (_, body) = get(build_app(&db), "/api/admin/statistics/eventTypeCount", Some(&token)).await;
    let counts = body["data"].as_array().unwrap();
    assert_eq!(counts.len(), 5);
    let theater = counts.iter().find(|c| c["event_type"] == "Theater").unwrap();
    assert_eq!(theater["count"], 1);

    let now = chrono::Utc::now();
    let (_, body) = get(
        build_app(&db),
        &format!("/api/admin/statistics/monthly?year={}", now.year()),
        Some(&token),
    )
    .await;
    let months = body["data"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[now.month0() as usize]["total_amount"], 12_000);
}
