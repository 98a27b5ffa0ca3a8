//! HTTP surface tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use clinical_deid_core::{Deidentifier, RegexDetector};
use clinical_deid_ner::{MockModelLoader, MockTokenClassifier, ModelDetector};
use clinical_deid_server::{build_app, AppState, Config};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn mock_app() -> Router {
    let classifier = MockTokenClassifier::new()
        .with_entity("Maria", "PATIENT")
        .with_entity("Lopez", "PATIENT");
    let model = Arc::new(ModelDetector::new(MockModelLoader::ready(classifier)));
    let deidentifier = Deidentifier::without_detectors()
        .with_detector(Arc::clone(&model))
        .with_detector(RegexDetector::default());

    build_app(AppState::new(deidentifier, model, "mock".to_string()))
}

fn regex_only_app() -> Router {
    build_app(AppState::from_config(&Config::default()))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn deidentify_returns_result_verbatim() {
    let app = regex_only_app();
    let body = json!({"text": "Contact John at john@example.com or 5551234567"}).to_string();

    let response = app.oneshot(post_json("/deidentify", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(
        value,
        json!({
            "input_text": "Contact John at john@example.com or 5551234567",
            "deidentified_text": "Contact John at [REDACTED:EMAIL] or [REDACTED:PHONE]",
            "entities": [
                {
                    "original": "john@example.com",
                    "start": 16,
                    "end": 32,
                    "original_tag": "EMAIL",
                    "remapped_tag": "EMAIL"
                },
                {
                    "original": "5551234567",
                    "start": 36,
                    "end": 46,
                    "original_tag": "PHONE",
                    "remapped_tag": "PHONE"
                }
            ]
        })
    );
}

#[tokio::test]
async fn deidentify_empty_text() {
    let app = regex_only_app();

    let response = app
        .oneshot(post_json("/deidentify", r#"{"text": ""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(
        value,
        json!({"input_text": "", "deidentified_text": "", "entities": []})
    );
}

#[tokio::test]
async fn deidentify_with_model() {
    let app = mock_app();
    let body = json!({"text": "Maria Lopez, 5551234567"}).to_string();

    let response = app.oneshot(post_json("/deidentify", &body)).await.unwrap();
    let value = body_json(response).await;

    assert_eq!(
        value["deidentified_text"],
        "[REDACTED:NAME], [REDACTED:PHONE]"
    );
    assert_eq!(value["entities"][0]["original_tag"], "PATIENT");
    assert_eq!(value["entities"][0]["remapped_tag"], "NAME");
}

#[tokio::test]
async fn deidentify_rejects_malformed_body() {
    let app = regex_only_app();

    let response = app
        .oneshot(post_json("/deidentify", r#"{"txt": 42}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let value = body_json(response).await;
    assert_eq!(value["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn health_does_not_load_model() {
    let app = mock_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["model"]["name"], "mock");
    assert_eq!(value["model"]["status"]["state"], "not_loaded");
}

#[tokio::test]
async fn ping_warms_up_model() {
    let app = mock_app();

    let response = app.clone().oneshot(get("/ping")).await.unwrap();
    let value = body_json(response).await;
    assert_eq!(value["message"], "All models warmed up and ready");
    assert_eq!(value["model"]["state"], "ready");

    let response = app.oneshot(get("/health")).await.unwrap();
    let value = body_json(response).await;
    assert_eq!(value["model"]["status"]["state"], "ready");
}

#[tokio::test]
async fn ping_without_model_configured() {
    let app = regex_only_app();

    let response = app.oneshot(get("/ping")).await.unwrap();
    let value = body_json(response).await;

    assert_eq!(value["model"]["state"], "unavailable");
    assert_eq!(value["model"]["reason"], "No model directory configured");
}
