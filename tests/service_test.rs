use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn service_index_lists_endpoint_groups() {
    let server = common::setup_test_server().await;

    let response = server.get("/").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Academic records API is running");
    assert_eq!(body["endpoints"]["subjects"], "/api/v1/subjects");
    assert_eq!(body["endpoints"]["teachers"], "/api/v1/teachers");
    assert_eq!(body["endpoints"]["courses"], "/api/v1/courses");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = common::setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = common::setup_test_server().await;

    let response = server.get("/api/v1/students").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
