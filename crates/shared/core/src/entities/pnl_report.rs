use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::kind::{EventKind, SymbolEvent};

/// Average-cost profit and loss report for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    pub symbol: String,
    pub last_price: Decimal,
    pub average_cost: Decimal,
    pub base_position: Decimal,
    pub realized_profit: Decimal,
    pub unrealized_profit: Decimal,
    pub num_trades: usize,
    pub generated_at: DateTime<Utc>,
}

impl ProfitAndLossReport {
    pub fn total_profit(&self) -> Decimal {
        self.realized_profit + self.unrealized_profit
    }
}

impl SymbolEvent for ProfitAndLossReport {
    const KIND: EventKind = EventKind::ProfitAndLoss;

    fn symbol(&self) -> &str {
        &self.symbol
    }
}
