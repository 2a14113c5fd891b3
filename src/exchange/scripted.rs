//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Test double for `ExchangeClient`: returns a pre-loaded sequence of outcomes, one per
// call, so processor lifecycle tests can script "transient, transient, ok" style
// sequences for retry behavior.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::models::Order;

use super::{ExchangeClient, PlacementOutcome};

pub struct ScriptedExchangeClient {
    outcomes: Arc<Mutex<Vec<PlacementOutcome>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExchangeClient {
    /// `outcomes` is consumed front-to-back, one per `place_order` call. If the script
    /// runs out, the client keeps returning the last outcome (tests should script
    /// exactly as many calls as they expect).
    pub fn new(outcomes: Vec<PlacementOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ExchangeClient for ScriptedExchangeClient {
    async fn place_order(&self, order: &Order) -> PlacementOutcome {
        self.calls.lock().await.push(order.id.clone());
        let mut outcomes = self.outcomes.lock().await;
        if outcomes.is_empty() {
            return PlacementOutcome::Ok;
        }
        outcomes.remove(0)
    }
}
