use serde::{Deserialize, Serialize};

/// Trading pair metadata loaded from an exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub symbol: String,
    pub base_currency: String,
    pub quote_currency: String,
}

impl Market {
    pub fn new(
        symbol: impl Into<String>,
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
    ) -> Self {
        Market {
            symbol: symbol.into().to_uppercase(),
            base_currency: base_currency.into().to_uppercase(),
            quote_currency: quote_currency.into().to_uppercase(),
        }
    }
}
