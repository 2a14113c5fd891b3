//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Integration tests for the HTTP submission endpoint, driven through the axum router
// with `tower::ServiceExt::oneshot` against an `InMemoryOrderStore` and a
// `ScriptedExchangeClient`, so no live Postgres instance or network is required.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use lemon_matching_engine::api::{self, AppState};
use lemon_matching_engine::exchange::ScriptedExchangeClient;
use lemon_matching_engine::facade::SubmissionFacade;
use lemon_matching_engine::processor::Processor;
use lemon_matching_engine::store::InMemoryOrderStore;

async fn setup_router() -> axum::Router {
    let store = Arc::new(InMemoryOrderStore::new());
    let exchange = Arc::new(ScriptedExchangeClient::new(vec![]));
    let (handle, _join) = Processor::spawn(store.clone(), exchange, 3, Duration::ZERO);
    let facade = SubmissionFacade::new(store.clone(), handle);
    let state = Arc::new(AppState::new(facade, store));
    api::build_router(state)
}

async fn parse_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_router().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_order_persists_and_returns_201() {
    let app = setup_router().await;

    let body = json!({
        "type": "limit",
        "side": "buy",
        "instrument": "DE0001234567",
        "limit_price": "100.00",
        "quantity": 10
    });

    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let parsed = parse_json(response).await;
    assert_eq!(parsed["type"], "limit");
    assert_eq!(parsed["side"], "buy");
    assert_eq!(parsed["instrument"], "DE0001234567");
    assert_eq!(parsed["quantity"], 10);
    assert_eq!(parsed["status"], "open");
    assert!(parsed["id"].is_string());
}

#[tokio::test]
async fn create_order_rejects_market_order_with_limit_price() {
    let app = setup_router().await;

    let body = json!({
        "type": "market",
        "side": "buy",
        "instrument": "DE0001234567",
        "limit_price": "100.00",
        "quantity": 10
    });

    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = parse_json(response).await;
    assert_eq!(parsed["field"], "limit_price");
}

#[tokio::test]
async fn create_order_rejects_wrong_instrument_length() {
    let app = setup_router().await;

    let body = json!({
        "type": "market",
        "side": "sell",
        "instrument": "TOO_SHORT",
        "quantity": 10
    });

    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let parsed = parse_json(response).await;
    assert_eq!(parsed["field"], "instrument");
}

#[tokio::test]
async fn create_order_rejects_malformed_price_scale() {
    let app = setup_router().await;

    let body = json!({
        "type": "limit",
        "side": "buy",
        "instrument": "DE0001234567",
        "limit_price": "100.5",
        "quantity": 10
    });

    let response = app
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submit_then_read_back_round_trips() {
    let app = setup_router().await;

    let body = json!({
        "type": "limit",
        "side": "sell",
        "instrument": "DE0001234567",
        "limit_price": "50.00",
        "quantity": 3
    });

    let create_response = app
        .clone()
        .oneshot(
            Request::post("/orders")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created = parse_json(create_response).await;
    let id = created["id"].as_str().unwrap().to_string();

    let read_response = app
        .oneshot(
            Request::get(format!("/orders/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(read_response.status(), StatusCode::OK);
    let read_back = parse_json(read_response).await;
    assert_eq!(read_back["id"], id);
    assert_eq!(read_back["quantity"], 3);
    assert_eq!(read_back["limit_price"], "50.00");
}

#[tokio::test]
async fn get_order_for_unknown_id_is_404() {
    let app = setup_router().await;

    let response = app
        .oneshot(
            Request::get("/orders/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
