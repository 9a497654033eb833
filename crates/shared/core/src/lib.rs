//! Athena Core Domain
//!
//! Pure domain types shared by the environment orchestration crates.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod session;
pub mod sync_status;

// Re-export commonly used types at crate root
pub use entities::{
    Balance, EventKind, Market, Order, OrderStatus, OrderType, ProfitAndLossReport, Side,
    SubmitOrder, SymbolEvent, Trade,
};
pub use session::{Credentials, MarginMode, StreamChannel, SubscribeOptions, Subscription};
pub use sync_status::SyncStatus;
