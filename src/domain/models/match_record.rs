//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A `Match` is one executed fill between a buy and a sell order. Matches are immutable
// once written; the processor only ever inserts them, never updates or deletes.
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Option<i64>,
    /// Internal surrogate key (`Order::pk`) of the buy-side order.
    pub buy_order_pk: i64,
    /// Internal surrogate key (`Order::pk`) of the sell-side order.
    pub sell_order_pk: i64,
    pub matched_quantity: i64,
    pub matched_at: DateTime<Utc>,
    pub instrument: String,
}

impl Match {
    pub fn new(
        buy_order_pk: i64,
        sell_order_pk: i64,
        matched_quantity: i64,
        matched_at: DateTime<Utc>,
        instrument: String,
    ) -> Self {
        Self {
            id: None,
            buy_order_pk,
            sell_order_pk,
            matched_quantity,
            matched_at,
            instrument,
        }
    }
}
