use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::{EventKind, SymbolEvent};
use super::order_status::OrderStatus;
use super::order_type::OrderType;
use super::side::Side;

/// Order state pushed by an exchange session's user data stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub client_order_id: String,
    pub exchange: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Decimal,
    pub quantity: Decimal,
    pub executed_quantity: Decimal,
    pub status: OrderStatus,
    pub update_time: DateTime<Utc>,
}

impl Order {
    pub fn remaining_quantity(&self) -> Decimal {
        (self.quantity - self.executed_quantity).max(Decimal::ZERO)
    }
}

impl SymbolEvent for Order {
    const KIND: EventKind = EventKind::Order;

    fn symbol(&self) -> &str {
        &self.symbol
    }
}
