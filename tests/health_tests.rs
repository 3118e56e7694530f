//! Health, version, OpenAPI and response header tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

mod common;
use common::{build_app, create_test_db, get};

#[tokio::test]
async fn test_health_check() {
    let db = create_test_db().await;

    let (status, body) = get(build_app(&db), "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_version() {
    let db = create_test_db().await;

    let (status, body) = get(build_app(&db), "/api/system/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document() {
    let db = create_test_db().await;

    let (status, body) = get(build_app(&db), "/api/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "ArtExpo API");
    assert!(body["paths"]["/api/user/book-event"].is_object());
    assert!(body["paths"]["/api/admin/statistics/monthly"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let db = create_test_db().await;

    // Also applies to errors from the auth layer
    for uri in ["/api/health", "/api/user/1"] {
        let response = build_app(&db)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let db = create_test_db().await;

    let (status, body) = get(build_app(&db), "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    // Unmatched paths under the protected prefixes are not auth failures
    let (status, _) = get(build_app(&db), "/api/user/1/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(build_app(&db), "/api/admin/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
