// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET  /health
// - POST /classify (happy path, unmatched fallback, invalid input)
// - POST /classify/image (recognizer wired, missing, invalid model output)
// - GET  /taxonomy
// - GET  /debug/last-classification, /debug/history

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use std::sync::Arc;

use waste_classifier::recognizer::{RecognizerLoader, StaticRecognizer};
use waste_classifier::{router, AppState, Prediction};

const BODY_LIMIT: usize = 1024 * 1024;

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

fn post_classify(payload: Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/classify")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /classify")
}

fn post_image(bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/classify/image")
        .header("content-type", "application/octet-stream")
        .body(Body::from(bytes))
        .expect("build POST /classify/image")
}

fn state_with_static(predictions: Vec<Prediction>) -> AppState {
    AppState::default().with_recognizer(RecognizerLoader::ready(Arc::new(
        StaticRecognizer::new(predictions),
    )))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, bytes) = send(router(AppState::default()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap().trim(), "ok");
}

#[tokio::test]
async fn classify_wine_bottle_returns_glass() {
    let payload = json!({ "predictions": [ { "label": "wine bottle", "probability": 1.0 } ] });
    let (status, bytes) = send(router(AppState::default()), post_classify(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["label"], "Recyclable");
    assert_eq!(v["subType"], "Glass");
    assert!(v["confidence"].as_f64().unwrap() >= 99.9);
    assert_eq!(v["tip"], "Clean and place in recycling bins.");
    assert_eq!(v["calibrated"], false);

    let all = v["allPredictions"].as_array().expect("allPredictions");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["label"], "Recyclable");
}

#[tokio::test]
async fn classify_unknown_label_falls_back_to_non_biodegradable() {
    let payload = json!({ "predictions": [ { "label": "xyzzy-unknown-token", "probability": 1.0 } ] });
    let (status, bytes) = send(router(AppState::default()), post_classify(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["label"], "Non-Biodegradable");
    assert_eq!(v["subType"], "General");
    assert_eq!(v["confidence"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn classify_rejects_out_of_range_probability() {
    let payload = json!({ "predictions": [
        { "label": "banana", "probability": 0.4 },
        { "label": "banana peel", "probability": 1.4 }
    ] });
    let (status, bytes) = send(router(AppState::default()), post_classify(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["code"], "invalid_input");
    assert!(v["error"].as_str().unwrap().contains("#1"));
}

#[tokio::test]
async fn empty_prediction_list_is_not_an_error() {
    let (status, bytes) =
        send(router(AppState::default()), post_classify(json!({ "predictions": [] }))).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["subType"], "General");
    assert_eq!(v["calibrated"], true);
    let sum: f64 = v["allPredictions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["confidence"].as_f64().unwrap())
        .sum();
    assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum={sum}");
}

#[tokio::test]
async fn taxonomy_lists_groups_in_order() {
    let (status, bytes) = send(router(AppState::default()), get("/taxonomy")).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    let groups = v.as_array().expect("array");
    assert!(!groups.is_empty());
    assert_eq!(groups[0]["category"], "Biodegradable");
    assert_eq!(groups[0]["sub_type"], "Organic");
}

#[tokio::test]
async fn debug_endpoints_reflect_last_classification() {
    let state = AppState::default();

    let (_, bytes) = send(router(state.clone()), get("/debug/last-classification")).await;
    assert_eq!(serde_json::from_slice::<Json>(&bytes).unwrap(), Json::Null);

    let payload = json!({ "predictions": [ { "label": "Granny Smith, apple", "probability": 0.8 } ] });
    let (status, _) = send(router(state.clone()), post_classify(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = send(router(state.clone()), get("/debug/last-classification")).await;
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["label"], "Biodegradable");
    assert_eq!(v["subType"], "Organic");
    assert_eq!(v["predictions"], 1);

    let (_, bytes) = send(router(state), get("/debug/history")).await;
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn classify_image_uses_configured_recognizer() {
    let state = state_with_static(vec![
        Prediction::new("wine bottle", 0.8),
        Prediction::new("beer bottle", 0.1),
    ]);
    let (status, bytes) = send(router(state.clone()), post_image(b"\x89PNG\r\n")).await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["label"], "Recyclable");
    assert_eq!(v["subType"], "Glass");
    assert_eq!(v["tip"], "Clean and place in recycling bins.");

    let (_, bytes) = send(router(state), get("/debug/last-classification")).await;
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["predictions"], 2);
}

#[tokio::test]
async fn classify_image_without_recognizer_is_unavailable() {
    let (status, bytes) = send(router(AppState::default()), post_image(b"\x89PNG")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["code"], "recognizer_unavailable");
}

#[tokio::test]
async fn classify_image_rejects_bad_model_output() {
    let state = state_with_static(vec![Prediction::new("banana", 1.7)]);
    let (status, bytes) = send(router(state), post_image(b"\x89PNG")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["code"], "invalid_input");
}
