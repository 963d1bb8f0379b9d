//! End-to-end fan-out behavior over the in-memory store: mutations
//! arriving through the HTTP surface must reach live subscribers.

use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thermo_gateway::http::routes::{router, AppState};
use thermo_gateway::storage::MemoryTemperatureStore;
use thermo_gateway::TemperatureStore;
use thermo_gateway::ws::registry::ConnectionId;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tower::ServiceExt;

const FRAME_WAIT: Duration = Duration::from_secs(1);

fn setup() -> (Arc<MemoryTemperatureStore>, AppState) {
    let store = Arc::new(MemoryTemperatureStore::new());
    let state = AppState::new(store.clone(), false);
    (store, state)
}

fn subscribe(state: &AppState) -> mpsc::UnboundedReceiver<Message> {
    let (tx, rx) = mpsc::unbounded_channel();
    state.registry.register(ConnectionId::new(), tx);
    rx
}

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
    let message = timeout(FRAME_WAIT, rx.recv())
        .await
        .expect("no frame within wait window")
        .expect("subscriber channel closed");
    let Message::Text(text) = message else {
        panic!("expected a text frame");
    };
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn create_broadcasts_post_mutation_snapshot() {
    let (_, state) = setup();
    let mut rx = subscribe(&state);
    let app = router(state);

    let response = app
        .oneshot(
            Request::post("/api/temperatures")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"city":"Makassar","temperature":32.5}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["type"], "data");
    assert_eq!(frame["data"]["summary"]["count"], 1);
    assert_eq!(frame["data"]["list"][0]["city"], "Makassar");
    assert_eq!(frame["data"]["list"][0]["temperature"], 32.5);
}

#[tokio::test]
async fn failed_subscriber_does_not_block_delivery() {
    let (_, state) = setup();

    // One connection already gone, one live
    let (tx_dead, rx_dead) = mpsc::unbounded_channel();
    drop(rx_dead);
    state.registry.register(ConnectionId::new(), tx_dead);
    let mut rx_live = subscribe(&state);
    assert_eq!(state.registry.len(), 2);

    let registry = state.registry.clone();
    let app = router(state);
    let response = app
        .oneshot(
            Request::post("/api/temperatures")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"city":"Palembang","temperature":30.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let frame = next_frame(&mut rx_live).await;
    assert_eq!(frame["data"]["list"][0]["city"], "Palembang");

    // The dead connection was pruned during the broadcast
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn randomize_batch_broadcasts_once() {
    let (store, state) = setup();
    for i in 0..3 {
        store.insert("Y", 40.0 + i as f64).await.unwrap();
    }
    let mut rx = subscribe(&state);
    let app = router(state);

    let response = app
        .oneshot(
            Request::patch("/api/temperatures/randomize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["data"]["summary"]["count"], 3);
    for entry in frame["data"]["list"].as_array().unwrap() {
        let t = entry["temperature"].as_f64().unwrap();
        assert!((20.0..35.0).contains(&t), "out of range: {t}");
    }

    // One frame for the whole batch, not one per row
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "expected exactly one broadcast");
}

#[tokio::test]
async fn rejected_mutation_broadcasts_nothing() {
    let (store, state) = setup();
    let mut rx = subscribe(&state);
    let app = router(state);

    let response = app
        .oneshot(
            Request::post("/api/temperatures")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"temperature":25.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rx.try_recv().is_err(), "no broadcast for a rejected mutation");
}

#[tokio::test]
async fn update_and_delete_each_broadcast_fresh_state() {
    let (store, state) = setup();
    let created = store.insert("Kupang", 27.0).await.unwrap();
    let mut rx = subscribe(&state);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/temperatures/{}", created.id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"city":"Kupang","temperature":29.5}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["data"]["list"][0]["temperature"], 29.5);

    let response = app
        .oneshot(
            Request::delete(format!("/api/temperatures/{}", created.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let frame = next_frame(&mut rx).await;
    assert_eq!(frame["data"]["summary"]["count"], 0);
    assert_eq!(frame["data"]["summary"]["average"], "0.00");
    assert!(frame["data"]["list"].as_array().unwrap().is_empty());
}
