use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::{EventKind, SymbolEvent};
use super::side::Side;

/// A fill reported by an exchange session's user data stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub order_id: u64,
    /// Exchange that reported the fill (e.g. "binance")
    pub exchange: String,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    pub fee_currency: String,
    pub is_maker: bool,
    pub time: DateTime<Utc>,
}

impl Trade {
    /// Returns the notional value of the trade (price * quantity)
    pub fn quote_quantity(&self) -> Decimal {
        self.price * self.quantity
    }
}

impl SymbolEvent for Trade {
    const KIND: EventKind = EventKind::Trade;

    fn symbol(&self) -> &str {
        &self.symbol
    }
}
