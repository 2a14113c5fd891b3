//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Wire-format request/response shapes for the HTTP submission endpoint, and the parsing
// that turns a `CreateOrderRequest` into a validated `OrderSubmission`. Field-level
// parsing lives here rather than in the facade so the facade stays usable with an already-typed
// `OrderSubmission` from non-HTTP callers.
//
// | Name               | Description                                                    |
// |--------------------|------------------------------------------------------------------|
// | CreateOrderRequest | The wire-format order submission                                |
// | FieldError         | Machine-readable validation failure: `{ field, message }`       |
// | OrderView          | The persisted-order view returned by POST/GET                  |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::models::order::{Order, OrderType, Side};
use crate::facade::OrderSubmission;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub instrument: String,
    #[serde(default)]
    pub limit_price: Option<String>,
    pub quantity: i64,
}

/// A single field-level validation failure, returned as the 422 body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl CreateOrderRequest {
    /// Parses the wire-format request into a typed, not-yet-constructed `OrderSubmission`.
    /// This stage only catches malformed *field encodings* (an unknown `type` string, a
    /// price string with the wrong number of fractional digits); the cross-field invariants
    /// (`market` forbids `limit_price`, etc.) are `Order::new`'s job one layer down, in the
    /// facade, and surface as the same `FieldError` shape via `ApiError`.
    pub fn try_into_submission(self) -> Result<OrderSubmission, FieldError> {
        let order_type = match self.order_type.as_str() {
            "market" => OrderType::Market,
            "limit" => OrderType::Limit,
            other => {
                return Err(FieldError::new(
                    "type",
                    format!("must be one of `market`, `limit`, got `{other}`"),
                ))
            }
        };

        let side = match self.side.as_str() {
            "buy" => Side::Buy,
            "sell" => Side::Sell,
            other => {
                return Err(FieldError::new(
                    "side",
                    format!("must be one of `buy`, `sell`, got `{other}`"),
                ))
            }
        };

        let limit_price = match self.limit_price {
            None => None,
            Some(raw) => Some(parse_two_decimal_places(&raw)?),
        };

        Ok(OrderSubmission {
            order_type,
            side,
            instrument: self.instrument,
            limit_price,
            quantity: self.quantity,
        })
    }
}

/// Parses a decimal string, requiring exactly two fractional digits. `rust_decimal`'s own
/// parser accepts e.g. "100" or "100.5" just as happily as "100.00"; the exact-scale
/// requirement is a wire-format concern, not a `Decimal` invariant, so it is enforced
/// here rather than in `Order::new`.
fn parse_two_decimal_places(raw: &str) -> Result<Decimal, FieldError> {
    let value: Decimal = raw
        .parse()
        .map_err(|_| FieldError::new("limit_price", format!("`{raw}` is not a valid decimal")))?;
    if value.scale() != 2 {
        return Err(FieldError::new(
            "limit_price",
            format!("must have exactly 2 fractional digits, got `{raw}`"),
        ));
    }
    Ok(value)
}

/// The persisted order view returned by `POST /orders` and `GET /orders/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub side: &'static str,
    pub instrument: String,
    pub limit_price: Option<Decimal>,
    pub quantity: i64,
    pub status: &'static str,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            order_type: match order.order_type {
                OrderType::Market => "market",
                OrderType::Limit => "limit",
            },
            side: match order.side {
                Side::Buy => "buy",
                Side::Sell => "sell",
            },
            instrument: order.instrument,
            limit_price: order.limit_price,
            quantity: order.quantity,
            status: match order.status {
                crate::domain::models::order::OrderStatus::Open => "open",
                crate::domain::models::order::OrderStatus::Submitted => "submitted",
                crate::domain::models::order::OrderStatus::Partial => "partial",
                crate::domain::models::order::OrderStatus::Matched => "matched",
                crate::domain::models::order::OrderStatus::Failed => "failed",
            },
        }
    }
}
