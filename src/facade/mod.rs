//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The submission facade: validates a submission, generates its id, persists it as OPEN,
// and enqueues the id for the processor. The facade never blocks on matching — it
// returns as soon as the order is durable and enqueued, inserting the row and handing
// off to the processor without waiting on it.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::models::order::{Order, OrderType, OrderValidationError, Side};
use crate::processor::ProcessorHandle;
use crate::store::{OrderStore, StoreError};

/// The validated shape of a submission, already past field-level parsing (see
/// `src/api/dto.rs` for the wire format this is built from). Carrying a typed
/// `OrderSubmission` rather than the raw request keeps the facade usable from
/// non-HTTP callers (tests, future entry points) without re-parsing strings.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub order_type: OrderType,
    pub side: Side,
    pub instrument: String,
    pub limit_price: Option<rust_decimal::Decimal>,
    pub quantity: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] OrderValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accepts a validated order request, generates an id, persists it as OPEN, and enqueues
/// it for the processor. Validation itself happens one layer up, at the API boundary, so
/// this facade can be reused with already-validated submissions.
pub struct SubmissionFacade<S: OrderStore> {
    store: Arc<S>,
    processor: ProcessorHandle,
}

impl<S: OrderStore> SubmissionFacade<S> {
    pub fn new(store: Arc<S>, processor: ProcessorHandle) -> Self {
        Self { store, processor }
    }

    pub async fn submit(&self, submission: OrderSubmission) -> Result<Order, SubmissionError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let order = Order::new(
            id,
            now,
            submission.order_type,
            submission.side,
            submission.instrument,
            submission.limit_price,
            submission.quantity,
        )?;

        let persisted = self.store.insert_order(&order).await?;
        self.processor.enqueue(persisted.id.clone());
        Ok(persisted)
    }
}
