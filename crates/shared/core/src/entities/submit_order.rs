use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::{EventKind, SymbolEvent};
use super::order_type::OrderType;
use super::side::Side;

/// An order request a strategy is about to submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrder {
    #[serde(default)]
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Limit price, absent for market orders
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl SymbolEvent for SubmitOrder {
    const KIND: EventKind = EventKind::SubmitOrder;

    fn symbol(&self) -> &str {
        &self.symbol
    }
}
