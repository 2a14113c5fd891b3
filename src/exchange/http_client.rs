//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Production `ExchangeClient`: POSTs the order to a configured upstream placement
// endpoint. Connection/timeout failures are classified `Transient` with the marker
// string the rest of the system matches on; any other non-2xx response is `Permanent`.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::models::Order;

use super::{ExchangeClient, PlacementOutcome, TRANSIENT_MARKER};

pub struct HttpExchangeClient {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct PlacementRequest<'a> {
    id: &'a str,
    instrument: &'a str,
    quantity: i64,
}

impl HttpExchangeClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ExchangeClient for HttpExchangeClient {
    async fn place_order(&self, order: &Order) -> PlacementOutcome {
        let body = PlacementRequest {
            id: &order.id,
            instrument: &order.instrument,
            quantity: order.quantity,
        };

        match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => PlacementOutcome::Ok,
            Ok(resp) if resp.status().is_server_error() => {
                PlacementOutcome::Transient(TRANSIENT_MARKER.to_string())
            }
            Ok(resp) => PlacementOutcome::Permanent(format!("upstream rejected: {}", resp.status())),
            Err(e) if e.is_connect() || e.is_timeout() => {
                PlacementOutcome::Transient(TRANSIENT_MARKER.to_string())
            }
            Err(e) => PlacementOutcome::Permanent(e.to_string()),
        }
    }
}
