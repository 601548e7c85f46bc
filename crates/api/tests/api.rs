//! Router-level tests driving the API with `tower::ServiceExt::oneshot`

use api::{create_router, AppState, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use storage::{fixtures, MemoryRepository};
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryRepository::new()), Settings::for_tests());
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn add_passports(app: &Router, n: usize) {
    for i in 1..=n {
        let passport = serde_json::to_value(fixtures::passport(&i.to_string())).unwrap();
        let (status, _) = send_json(app, Method::POST, "/api/passports", Some(passport)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["counts"]["combinations"], 0);
}

#[tokio::test]
async fn component_create_validates_and_rejects_duplicates() {
    let app = app();
    let analyte = serde_json::to_value(fixtures::analyte("TA1")).unwrap();

    let (status, body) = send_json(&app, Method::POST, "/api/analytes", Some(analyte.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, body) = send_json(&app, Method::POST, "/api/analytes", Some(analyte)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let mut invalid = fixtures::analyte("XX1");
    invalid.ph_min = 9.5;
    invalid.ph_max = 3.0;
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/analytes",
        Some(serde_json::to_value(invalid).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn component_lists_are_paginated() {
    let app = app();
    for i in 1..=3 {
        let record = serde_json::to_value(fixtures::memristive(&format!("MEM{}", i))).unwrap();
        let (status, _) = send_json(&app, Method::POST, "/api/memristive", Some(record)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(&app, Method::GET, "/api/memristive?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["mem_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["MEM2", "MEM3"]);

    let (status, _) = send_json(&app, Method::GET, "/api/memristive?limit=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = send_json(&app, Method::GET, "/api/memristive?limit=1001", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_passport_stores_nothing() {
    let app = app();
    let mut passport = fixtures::passport("1");
    passport.memristive.reproducibility = 150;

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/passports",
        Some(serde_json::to_value(passport).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send_json(&app, Method::GET, "/api/analytes", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn synthesize_creates_then_finds_only_duplicates() {
    let app = app();
    add_passports(&app, 2).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/combinations/synthesize?max_combinations=100",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["checked"], 16);
    assert_eq!(body["created"], 16);
    assert_eq!(body["truncated"], false);
    assert_eq!(body["max_checked"], 100);

    let (_, body) = send_json(&app, Method::POST, "/api/combinations/synthesize", None).await;
    assert_eq!(body["checked"], 16);
    assert_eq!(body["created"], 0);
    assert_eq!(body["max_checked"], 5000);

    let (_, body) = send_json(&app, Method::GET, "/api/combinations?limit=1000", None).await;
    let combos = body.as_array().unwrap();
    assert_eq!(combos.len(), 16);
    assert_eq!(combos[0]["combination_id"], "SC000001");
    for combo in combos {
        let score = combo["score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
    }
}

#[tokio::test]
async fn synthesize_stops_at_requested_cap() {
    let app = app();
    add_passports(&app, 2).await;

    let (_, body) = send_json(
        &app,
        Method::POST,
        "/api/combinations/synthesize?max_combinations=10",
        None,
    )
    .await;
    assert_eq!(body["checked"], 10);
    assert_eq!(body["created"], 10);
    assert_eq!(body["truncated"], true);
}

#[tokio::test]
async fn synthesize_rejects_out_of_range_request() {
    let app = app();
    for uri in [
        "/api/combinations/synthesize?max_combinations=0",
        "/api/combinations/synthesize?max_combinations=50001",
    ] {
        let (status, _) = send_json(&app, Method::POST, uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
}

#[tokio::test]
async fn manual_combination_lifecycle() {
    let app = app();
    add_passports(&app, 1).await;
    let request = json!({ "ta_id": "TA1", "bre_id": "BRE1", "im_id": "IM1", "mem_id": "MEM1" });

    let (status, body) =
        send_json(&app, Method::POST, "/api/combinations", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["combination_id"], "SC000001");

    let (status, _) = send_json(&app, Method::POST, "/api/combinations", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let unknown = json!({ "ta_id": "TA1", "bre_id": "BRE9", "im_id": "IM1", "mem_id": "MEM1" });
    let (status, _) = send_json(&app, Method::POST, "/api/combinations", Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&app, Method::POST, "/api/combinations/synthesize", None).await;
    assert_eq!(body["checked"], 1);
    assert_eq!(body["created"], 0);
}

#[tokio::test]
async fn analytics_endpoints() {
    let app = app();
    add_passports(&app, 2).await;
    send_json(&app, Method::POST, "/api/combinations/synthesize", None).await;

    let (status, body) = send_json(&app, Method::GET, "/api/analytics/statistics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["combinations"], 16);
    assert_eq!(body["tuple_space"], 16);
    assert_eq!(body["coverage"], 1.0);

    let (status, body) =
        send_json(&app, Method::GET, "/api/analytics/best-combinations?limit=3", None).await;
    assert_eq!(status, StatusCode::OK);
    let best = body.as_array().unwrap();
    assert_eq!(best.len(), 3);
    assert_eq!(best[0]["rank"], 1);
    assert!(best[0]["score"].as_f64().unwrap() >= best[2]["score"].as_f64().unwrap());
    assert!(best[0]["ta_name"].as_str().unwrap().starts_with("Analyte"));

    let (status, _) =
        send_json(&app, Method::GET, "/api/analytics/best-combinations?limit=101", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send_json(&app, Method::GET, "/api/analytics/comparative", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["layers"].as_array().unwrap().len(), 3);
    assert_eq!(body["components"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn export_formats() {
    let app = app();
    add_passports(&app, 1).await;

    let request = Request::builder()
        .uri("/api/export/analytes?format=csv")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"analytes_"));
    assert!(disposition.ends_with(".csv\""));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("ta_id,ta_name,"));
    assert_eq!(csv.lines().count(), 2);

    let (status, body) = send_json(&app, Method::GET, "/api/export/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analytes"].as_array().unwrap().len(), 1);
    assert!(body["sensor_combinations"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/api/export/analytes?format=excel", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::GET, "/api/export/all?format=csv", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::GET, "/api/export/users", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_without_recorder_is_not_found() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_with_handle_render_text() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(Arc::new(MemoryRepository::new()), Settings::for_tests())
        .with_metrics(handle);
    let app = create_router(state);

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(std::str::from_utf8(&bytes).is_ok());
}

#[tokio::test]
async fn malformed_requests_use_error_body() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/analytes",
        Some(json!({ "ta_id": "TA1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("ta_name"));

    let mut immobilization = serde_json::to_value(fixtures::immobilization("IM1")).unwrap();
    immobilization["adhesion"] = json!("sticky");
    let (status, body) =
        send_json(&app, Method::POST, "/api/immobilization", Some(immobilization)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let request = Request::post("/api/analytes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"ta_id\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/combinations/synthesize?max_combinations=abc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send_json(&app, Method::GET, "/api/analytes?limit=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send_json(&app, Method::GET, "/api/export/analytes?format=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
