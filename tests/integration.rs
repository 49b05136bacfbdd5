use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ride_hailing_api::api::rest::router;
use ride_hailing_api::state::AppState;
use ride_hailing_api::store::{DocumentStore, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    let (app, _state) = setup_with_state();
    app
}

fn setup_with_state() -> (axum::Router, Arc<AppState>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new("integration"));
    let state = Arc::new(AppState::new(store, 64));
    (router(state.clone()), state)
}

fn setup_detached() -> axum::Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::detached());
    router(Arc::new(AppState::new(store, 64)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn driver_payload(name: &str) -> Value {
    json!({
        "name": name,
        "car_model": "Toyota Prius",
        "plate": "ABC-123",
        "lat": 40.7128,
        "lng": -74.0060
    })
}

fn ride_payload(phone: &str) -> Value {
    json!({
        "rider_name": "Ana",
        "rider_phone": phone,
        "pickup": { "lat": 0.0, "lng": 0.0 },
        "dropoff": { "lat": 0.0, "lng": 1.0 }
    })
}

async fn create_driver(app: &axum::Router, name: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/drivers", driver_payload(name)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn request_ride(app: &axum::Router, phone: &str) -> Value {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/rides/request", ride_payload(phone)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await
}

async fn list(app: &axum::Router, uri: &str) -> Vec<Value> {
    let res = app.clone().oneshot(get_request(uri)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await.as_array().unwrap().clone()
}

#[tokio::test]
async fn root_reports_running() {
    let app = setup();
    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Ride Hailing Backend is running");
}

#[tokio::test]
async fn health_counts_records() {
    let app = setup();
    create_driver(&app, "Dana").await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["drivers"], 1);
    assert_eq!(body["riders"], 0);
    assert_eq!(body["rides"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    request_ride(&app, "555-0100").await;

    let response = app.oneshot(get_request("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("rides_requested_total{outcome=\"requested\"} 1"));
}

#[tokio::test]
async fn failed_operations_still_record_latency() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";

    let res = app
        .clone()
        .oneshot(post_request(&format!("/rides/{fake_id}/complete")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(post_request(&format!("/rides/{fake_id}/cancel")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = body_string(app.oneshot(get_request("/metrics")).await.unwrap()).await;
    assert!(body.contains("ride_operation_latency_seconds_count{operation=\"complete\"} 1"));
    assert!(body.contains("ride_operation_latency_seconds_count{operation=\"cancel\"} 1"));
    assert!(!body.contains("rides_closed_total{"));
}

#[tokio::test]
async fn unavailable_store_still_records_request_latency() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::detached());
    let state = Arc::new(AppState::new(store, 64));
    let app = router(state.clone());

    let res = app
        .oneshot(json_request("POST", "/rides/request", ride_payload("555")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = state.metrics.encode().unwrap();
    assert!(body.contains("ride_operation_latency_seconds_count{operation=\"request\"} 1"));
}

#[tokio::test]
async fn diagnostics_lists_collections() {
    let app = setup();
    create_driver(&app, "Dana").await;

    let response = app.oneshot(get_request("/test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["backend"], "running");
    assert_eq!(body["connection_status"], "Connected");
    assert_eq!(body["database_name"], "integration");
    assert!(body.as_object().unwrap().contains_key("database_url"));
    assert!(body["database_url"].is_null());
    assert_eq!(body["collections"], json!(["driver"]));
}

#[tokio::test]
async fn create_rider_returns_201_with_id() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/riders",
            json!({ "name": "Ana", "phone": "555-0100" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_rider_accepts_blank_fields() {
    let app = setup();
    let response = app
        .oneshot(json_request("POST", "/riders", json!({ "name": "", "phone": "" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn ride_request_with_blank_name_reuses_rider() {
    let app = setup();
    request_ride(&app, "555-0100").await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/rides/request",
            json!({
                "rider_name": "",
                "rider_phone": "555-0100",
                "pickup": { "lat": 0.0, "lng": 0.0 },
                "dropoff": { "lat": 0.0, "lng": 1.0 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let rides = list(&app, "/rides").await;
    assert_eq!(rides[0]["rider_id"], rides[1]["rider_id"]);
}

#[tokio::test]
async fn registered_driver_is_listed_and_available() {
    let app = setup();
    let id = create_driver(&app, "Dana").await;

    let drivers = list(&app, "/drivers").await;
    assert_eq!(drivers.len(), 1);

    let driver = &drivers[0];
    assert_eq!(driver["_id"], id);
    assert_eq!(driver["name"], "Dana");
    assert_eq!(driver["plate"], "ABC-123");
    assert_eq!(driver["lat"], 40.7128);
    assert_eq!(driver["is_available"], true);
    assert!(driver["created_at"].is_string());
}

#[tokio::test]
async fn create_driver_missing_fields_is_rejected_as_json() {
    let app = setup();
    let response = app
        .oneshot(json_request("POST", "/drivers", json!({ "name": "Dana" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("car_model"));
}

#[tokio::test]
async fn malformed_ride_request_body_is_rejected_as_json() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rides/request")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_content_type_is_rejected_as_json() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/riders")
                .body(Body::from(r#"{"name":"Ana","phone":"1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn ride_without_drivers_is_requested() {
    let app = setup();
    let ticket = request_ride(&app, "555-0100").await;

    assert_eq!(ticket["status"], "requested");
    assert!(ticket["driver_id"].is_null());
    assert!(!ticket["ride_id"].as_str().unwrap().is_empty());

    let rides = list(&app, "/rides").await;
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0]["_id"], ticket["ride_id"]);
    assert_eq!(rides[0]["fare_estimate"], 135.93);
    assert_eq!(rides[0]["pickup"], json!({ "lat": 0.0, "lng": 0.0 }));
}

#[tokio::test]
async fn full_ride_lifecycle() {
    let app = setup();
    let driver_id = create_driver(&app, "Dana").await;

    let ticket = request_ride(&app, "555-0100").await;
    assert_eq!(ticket["status"], "accepted");
    assert_eq!(ticket["driver_id"], driver_id);

    let drivers = list(&app, "/drivers").await;
    assert_eq!(drivers[0]["is_available"], false);

    let second = request_ride(&app, "555-0101").await;
    assert_eq!(second["status"], "requested");

    let ride_id = ticket["ride_id"].as_str().unwrap();
    let res = app
        .clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/complete")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "Ride completed");

    let drivers = list(&app, "/drivers").await;
    assert_eq!(drivers[0]["is_available"], true);

    let rides = list(&app, "/rides").await;
    let completed = rides
        .iter()
        .find(|ride| ride["_id"] == ticket["ride_id"])
        .unwrap();
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["driver_id"], driver_id);
}

#[tokio::test]
async fn cancel_releases_driver() {
    let app = setup();
    create_driver(&app, "Dana").await;
    let ticket = request_ride(&app, "555-0100").await;
    let ride_id = ticket["ride_id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/cancel")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["message"], "Ride cancelled");

    let drivers = list(&app, "/drivers").await;
    assert_eq!(drivers[0]["is_available"], true);

    let rides = list(&app, "/rides").await;
    assert_eq!(rides[0]["status"], "cancelled");
}

#[tokio::test]
async fn same_phone_reuses_rider() {
    let app = setup();
    request_ride(&app, "555-0100").await;
    request_ride(&app, "555-0100").await;

    let rides = list(&app, "/rides").await;
    assert_eq!(rides.len(), 2);
    assert_eq!(rides[0]["rider_id"], rides[1]["rider_id"]);
}

#[tokio::test]
async fn complete_unknown_ride_returns_404() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";

    let response = app
        .clone()
        .oneshot(post_request(&format!("/rides/{fake_id}/complete")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_request("/rides/not-an-id/cancel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_requests_book_a_driver_once() {
    let app = setup();
    create_driver(&app, "Dana").await;

    let mut handles = Vec::new();
    for n in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            request_ride(&app, &format!("555-01{n:02}")).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap()["status"] == "accepted" {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn ride_events_are_published() {
    let (app, state) = setup_with_state();
    let mut events = state.ride_events_tx.subscribe();

    create_driver(&app, "Dana").await;
    let ticket = request_ride(&app, "555-0100").await;
    let ride_id = ticket["ride_id"].as_str().unwrap();
    app.clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/complete")))
        .await
        .unwrap();

    let requested = events.recv().await.unwrap();
    assert_eq!(requested.ride_id.as_str(), ride_id);
    assert_eq!(requested.status.as_str(), "accepted");

    let completed = events.recv().await.unwrap();
    assert_eq!(completed.status.as_str(), "completed");
    assert_eq!(completed.fare_estimate, Some(135.93));
}

#[tokio::test]
async fn detached_store_returns_503_not_empty_results() {
    let app = setup_detached();

    let res = app.clone().oneshot(get_request("/drivers")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = app.clone().oneshot(get_request("/rides")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = app
        .clone()
        .oneshot(json_request("POST", "/rides/request", ride_payload("555")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(res).await["error"], "store unavailable");

    let res = app
        .clone()
        .oneshot(post_request("/rides/whatever/complete"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn detached_store_is_reported_by_diagnostics() {
    let app = setup_detached();

    let body = body_json(app.clone().oneshot(get_request("/test")).await.unwrap()).await;
    assert_eq!(body["database"], "not initialized");
    assert_eq!(body["connection_status"], "Not Connected");
    assert!(body["database_name"].is_null());
    assert!(body["database_url"].is_null());

    let body = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(body["status"], "degraded");
    assert!(body["rides"].is_null());
}
