//! Installs the global Prometheus recorder, so it runs in its own test binary

use api::{create_router, init_metrics, AppState, Settings};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use std::sync::Arc;
use storage::{fixtures, MemoryRepository};
use tower::ServiceExt;

#[tokio::test]
async fn metrics_expose_registry_counters() {
    let handle = init_metrics().unwrap();
    let state = AppState::new(Arc::new(MemoryRepository::new()), Settings::for_tests())
        .with_metrics(handle);
    let app = create_router(state);

    let passport = serde_json::to_vec(&fixtures::passport("1")).unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/passports")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(passport))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/combinations/synthesize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("biosensor_synthesis_runs_total 1"));
    assert!(text.contains("biosensor_components_created_total{kind=\"analyte\"} 1"));
    assert!(text.contains("biosensor_synthesis_duration_seconds"));
}
