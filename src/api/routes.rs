//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                          | Return Type    |
// |---------------|------------------------------------------------------|----------------|
// | health        | Liveness probe                                        | impl IntoResponse |
// | create_order  | Validate, persist (OPEN), and enqueue a submission    | ApiResult<Response> |
// | get_order     | Read back the current persisted state of an order     | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::store::OrderStore;

use super::dto::{CreateOrderRequest, OrderView};
use super::error::{ApiError, ApiResult};
use super::AppState;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /orders`. Validates the request, persists it as `OPEN`, and enqueues its id for
/// the processor; never waits for a match or placement attempt.
pub async fn create_order<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Response> {
    let submission = req.try_into_submission()?;
    let order = state.facade.submit(submission).await?;
    Ok((StatusCode::CREATED, Json(OrderView::from(order))).into_response())
}

/// `GET /orders/:id` — an ambient addition so the submit → read-back round trip is
/// observable over HTTP, not just via the store trait directly.
pub async fn get_order<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let order = state.store.load_order(&id).await.map_err(|e| {
        error!(error = %e, order_id = %id, "store error loading order");
        ApiError::from(e)
    })?;
    match order {
        Some(order) => Ok((StatusCode::OK, Json(OrderView::from(order))).into_response()),
        None => Err(ApiError::NotFound(format!("order {id} not found"))),
    }
}
