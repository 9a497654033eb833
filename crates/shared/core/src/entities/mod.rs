mod balance;
mod kind;
mod market;
mod order;
mod order_status;
mod order_type;
mod pnl_report;
mod side;
mod submit_order;
mod trade;

pub use balance::Balance;
pub use kind::{EventKind, SymbolEvent};
pub use market::Market;
pub use order::Order;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use pnl_report::ProfitAndLossReport;
pub use side::Side;
pub use submit_order::SubmitOrder;
pub use trade::Trade;
