use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account balance of a single currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    pub available: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn new(currency: impl Into<String>, available: Decimal, locked: Decimal) -> Self {
        Balance {
            currency: currency.into().to_uppercase(),
            available,
            locked,
        }
    }

    /// Available plus locked funds
    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }
}
