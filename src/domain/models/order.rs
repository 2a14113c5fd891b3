//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core `Order` type and the small enums that describe its shape
// (side, type, lifecycle status). An `Order` is one submission: buy or sell, market or
// limit, on a single 12-character instrument.
//
// | Section          | Description                                                        |
// |------------------|---------------------------------------------------------------------|
// | ENUMS            | Side, OrderType, OrderStatus                                        |
// | Order            | The order itself, plus the invariants constructors enforce          |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The side of an order: buyer or seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// An order either accepts any available price (`Market`) or bounds it (`Limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// Lifecycle status. `Matched` and `Failed` are terminal; an order in either state no
/// longer appears in the book (see `OrderBook::remove`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Submitted,
    Partial,
    Matched,
    Failed,
}

impl OrderStatus {
    /// Orders eligible to be yielded as match candidates or re-matched by the processor.
    pub fn is_restable(&self) -> bool {
        matches!(self, Self::Open | Self::Submitted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Matched | Self::Failed)
    }
}

/// Raised by `Order::new` when a submission violates one of its construction invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("limit_price is required for limit orders")]
    MissingLimitPrice,
    #[error("limit_price must not be set for market orders")]
    UnexpectedLimitPrice,
    #[error("limit_price must be greater than zero")]
    NonPositiveLimitPrice,
    #[error("instrument must be exactly 12 characters, got {0}")]
    WrongInstrumentLength(usize),
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
}

/// A standing instruction to buy or sell `quantity` of `instrument`.
///
/// `pk` is the store's internal surrogate key (used only for the `matches` foreign
/// keys); `id` is the opaque, public, stable identifier returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub pk: Option<i64>,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub order_type: OrderType,
    pub side: Side,
    pub instrument: String,
    pub limit_price: Option<Decimal>,
    pub quantity: i64,
    pub status: OrderStatus,
}

impl Order {
    /// Builds a fresh `OPEN` order, stamping `created_at` to `now` and assigning `id`.
    /// Returns `OrderValidationError` if the request violates §3's invariants.
    pub fn new(
        id: String,
        now: DateTime<Utc>,
        order_type: OrderType,
        side: Side,
        instrument: String,
        limit_price: Option<Decimal>,
        quantity: i64,
    ) -> Result<Self, OrderValidationError> {
        if instrument.len() != 12 {
            return Err(OrderValidationError::WrongInstrumentLength(instrument.len()));
        }
        if quantity <= 0 {
            return Err(OrderValidationError::NonPositiveQuantity);
        }
        match (order_type, limit_price) {
            (OrderType::Market, Some(_)) => return Err(OrderValidationError::UnexpectedLimitPrice),
            (OrderType::Limit, None) => return Err(OrderValidationError::MissingLimitPrice),
            (OrderType::Limit, Some(p)) if p <= Decimal::ZERO => {
                return Err(OrderValidationError::NonPositiveLimitPrice);
            }
            _ => {}
        }

        Ok(Self {
            pk: None,
            id,
            created_at: now,
            order_type,
            side,
            instrument,
            limit_price,
            quantity,
            status: OrderStatus::Open,
        })
    }

    /// The effective price used for book placement: the limit price for limit orders,
    /// `None` for market orders (the book keeps market orders in a dedicated bucket
    /// rather than a synthetic infinite price — see `OrderBook`).
    pub fn effective_price(&self) -> Option<Decimal> {
        self.limit_price
    }

    /// A limit order never crosses at a price worse than its own limit.
    pub fn crosses(&self, candidate_price: Decimal) -> bool {
        match (self.order_type, self.limit_price) {
            (OrderType::Market, _) => true,
            (OrderType::Limit, Some(limit)) => match self.side {
                Side::Buy => candidate_price <= limit,
                Side::Sell => candidate_price >= limit,
            },
            (OrderType::Limit, None) => unreachable!("limit order without a limit_price"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn market_order_with_limit_price_is_rejected() {
        let err = Order::new(
            "id".into(),
            now(),
            OrderType::Market,
            Side::Buy,
            "DE0001234567".into(),
            Some(Decimal::new(10000, 2)),
            10,
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::UnexpectedLimitPrice);
    }

    #[test]
    fn limit_order_without_limit_price_is_rejected() {
        let err = Order::new(
            "id".into(),
            now(),
            OrderType::Limit,
            Side::Buy,
            "DE0001234567".into(),
            None,
            10,
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::MissingLimitPrice);
    }

    #[test]
    fn wrong_instrument_length_is_rejected() {
        let err = Order::new(
            "id".into(),
            now(),
            OrderType::Market,
            Side::Buy,
            "TOO_SHORT".into(),
            None,
            10,
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::WrongInstrumentLength(9));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let err = Order::new(
            "id".into(),
            now(),
            OrderType::Market,
            Side::Buy,
            "DE0001234567".into(),
            None,
            0,
        )
        .unwrap_err();
        assert_eq!(err, OrderValidationError::NonPositiveQuantity);
    }

    #[test]
    fn limit_buy_crosses_only_at_or_below_its_limit() {
        let order = Order::new(
            "id".into(),
            now(),
            OrderType::Limit,
            Side::Buy,
            "DE0001234567".into(),
            Some(Decimal::new(10000, 2)),
            10,
        )
        .unwrap();
        assert!(order.crosses(Decimal::new(9999, 2)));
        assert!(order.crosses(Decimal::new(10000, 2)));
        assert!(!order.crosses(Decimal::new(10001, 2)));
    }
}
