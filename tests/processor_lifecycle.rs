//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// End-to-end lifecycle scenarios (full cross, partial cross, no-cross placement, retry
// success, retry exhaustion, order vanished before processing), driven through the real
// queue (`ProcessorHandle::enqueue` → `Processor::run`) rather than by calling
// `process_one` directly, against `InMemoryOrderStore` and `ScriptedExchangeClient`.
// `tokio::time::pause` lets the retry-delay scenarios run instantly under the test
// harness.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use lemon_matching_engine::domain::models::order::{OrderStatus, OrderType, Side};
use lemon_matching_engine::exchange::ScriptedExchangeClient;
use lemon_matching_engine::facade::{OrderSubmission, SubmissionFacade};
use lemon_matching_engine::processor::Processor;
use lemon_matching_engine::store::InMemoryOrderStore;
use lemon_matching_engine::{Order, PlacementOutcome};

const INSTRUMENT: &str = "DE0001234567";

fn resting_order(id: &str, side: Side, price: &str, quantity: i64) -> Order {
    Order::new(
        id.to_string(),
        Utc::now(),
        OrderType::Limit,
        side,
        INSTRUMENT.to_string(),
        Some(price.parse().unwrap()),
        quantity,
    )
    .unwrap()
}

/// Gives the processor task a chance to drain the queue. The in-memory store and scripted
/// exchange client do no real I/O, so a short fixed wait is enough without flakiness.
async fn let_processor_drain() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn scenario_1_full_cross_limit_vs_limit() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sell = store.seed(resting_order("S", Side::Sell, "100.00", 10)).await;

    let exchange = Arc::new(ScriptedExchangeClient::new(vec![]));
    let (handle, _join) = Processor::spawn(store.clone(), exchange.clone(), 3, Duration::ZERO);
    let facade = SubmissionFacade::new(store.clone(), handle);

    let buy = facade
        .submit(OrderSubmission {
            order_type: OrderType::Limit,
            side: Side::Buy,
            instrument: INSTRUMENT.to_string(),
            limit_price: Some("100.00".parse().unwrap()),
            quantity: 10,
        })
        .await
        .unwrap();

    let_processor_drain().await;

    let buy_after = store.load_order(&buy.id).await.unwrap().unwrap();
    let sell_after = store.load_order(&sell.id).await.unwrap().unwrap();
    assert_eq!(buy_after.status, OrderStatus::Matched);
    assert_eq!(buy_after.quantity, 0);
    assert_eq!(sell_after.status, OrderStatus::Matched);
    assert_eq!(sell_after.quantity, 0);
    assert_eq!(exchange.call_count().await, 0);

    let matches = store.matches_for(sell_after.pk.unwrap()).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].matched_quantity, 10);
}

#[tokio::test]
async fn scenario_2_partial_cross_leaves_buy_resting() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sell = store.seed(resting_order("S", Side::Sell, "100.00", 5)).await;

    let exchange = Arc::new(ScriptedExchangeClient::new(vec![]));
    let (handle, _join) = Processor::spawn(store.clone(), exchange.clone(), 3, Duration::ZERO);
    let facade = SubmissionFacade::new(store.clone(), handle);

    let buy = facade
        .submit(OrderSubmission {
            order_type: OrderType::Limit,
            side: Side::Buy,
            instrument: INSTRUMENT.to_string(),
            limit_price: Some("100.00".parse().unwrap()),
            quantity: 10,
        })
        .await
        .unwrap();

    let_processor_drain().await;

    let buy_after = store.load_order(&buy.id).await.unwrap().unwrap();
    let sell_after = store.load_order(&sell.id).await.unwrap().unwrap();
    assert_eq!(buy_after.status, OrderStatus::Partial);
    assert_eq!(buy_after.quantity, 5);
    assert_eq!(sell_after.status, OrderStatus::Matched);
    assert_eq!(exchange.call_count().await, 0);
}

#[tokio::test]
async fn scenario_3_no_cross_places_successfully() {
    let store = Arc::new(InMemoryOrderStore::new());
    let exchange = Arc::new(ScriptedExchangeClient::new(vec![PlacementOutcome::Ok]));
    let (handle, _join) = Processor::spawn(store.clone(), exchange.clone(), 3, Duration::ZERO);
    let facade = SubmissionFacade::new(store.clone(), handle);

    let buy = facade
        .submit(OrderSubmission {
            order_type: OrderType::Limit,
            side: Side::Buy,
            instrument: INSTRUMENT.to_string(),
            limit_price: Some("100.00".parse().unwrap()),
            quantity: 10,
        })
        .await
        .unwrap();

    let_processor_drain().await;

    let buy_after = store.load_order(&buy.id).await.unwrap().unwrap();
    assert_eq!(buy_after.status, OrderStatus::Submitted);
    assert_eq!(buy_after.quantity, 10);
    assert_eq!(exchange.call_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn scenario_4_transient_failure_retries_then_succeeds() {
    let store = Arc::new(InMemoryOrderStore::new());
    let exchange = Arc::new(ScriptedExchangeClient::new(vec![
        PlacementOutcome::Transient("Connection not available".into()),
        PlacementOutcome::Transient("Connection not available".into()),
        PlacementOutcome::Ok,
    ]));
    let (handle, _join) = Processor::spawn(
        store.clone(),
        exchange.clone(),
        3,
        Duration::from_secs(5),
    );
    let facade = SubmissionFacade::new(store.clone(), handle);

    let buy = facade
        .submit(OrderSubmission {
            order_type: OrderType::Limit,
            side: Side::Buy,
            instrument: INSTRUMENT.to_string(),
            limit_price: Some("100.00".parse().unwrap()),
            quantity: 10,
        })
        .await
        .unwrap();

    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
    }

    let buy_after = store.load_order(&buy.id).await.unwrap().unwrap();
    assert_eq!(buy_after.status, OrderStatus::Submitted);
    assert_eq!(exchange.call_count().await, 3);
}

#[tokio::test(start_paused = true)]
async fn scenario_5_transient_failure_exhausted_fails_order() {
    let store = Arc::new(InMemoryOrderStore::new());
    let exchange = Arc::new(ScriptedExchangeClient::new(vec![
        PlacementOutcome::Transient("Connection not available".into()),
        PlacementOutcome::Transient("Connection not available".into()),
        PlacementOutcome::Transient("Connection not available".into()),
    ]));
    let (handle, _join) = Processor::spawn(
        store.clone(),
        exchange.clone(),
        2,
        Duration::from_secs(5),
    );
    let facade = SubmissionFacade::new(store.clone(), handle);

    let buy = facade
        .submit(OrderSubmission {
            order_type: OrderType::Limit,
            side: Side::Buy,
            instrument: INSTRUMENT.to_string(),
            limit_price: Some("100.00".parse().unwrap()),
            quantity: 10,
        })
        .await
        .unwrap();

    for _ in 0..3 {
        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
    }

    let buy_after = store.load_order(&buy.id).await.unwrap().unwrap();
    assert_eq!(buy_after.status, OrderStatus::Failed);
}

#[tokio::test]
async fn scenario_6_order_gone_between_enqueue_and_process() {
    let store = Arc::new(InMemoryOrderStore::new());
    let exchange = Arc::new(ScriptedExchangeClient::new(vec![]));
    let (handle, _join) = Processor::spawn(store.clone(), exchange.clone(), 3, Duration::ZERO);

    // Enqueue an id the store has never heard of — the worker should drop it silently
    // rather than erroring.
    handle.enqueue("ghost-id".to_string());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(exchange.call_count().await, 0);
}
