use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of domain events the notification layer knows how to route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Trade,
    Order,
    SubmitOrder,
    ProfitAndLoss,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Trade => "trade",
            EventKind::Order => "order",
            EventKind::SubmitOrder => "submit_order",
            EventKind::ProfitAndLoss => "profit_and_loss",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event that belongs to a single trading symbol.
///
/// Symbol-based notification routing keys on [`SymbolEvent::symbol`], and the
/// template used to render the event is picked by [`SymbolEvent::KIND`].
pub trait SymbolEvent: Serialize + Send + Sync + 'static {
    const KIND: EventKind;

    fn symbol(&self) -> &str;
}
