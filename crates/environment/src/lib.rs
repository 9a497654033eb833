//! Athena Environment
//!
//! Composition root of the trading process. Owns the exchange sessions and
//! everything wired around them:
//!
//! ```text
//!   config ──► ExchangeFactory ──► SessionRegistry ──┬──► init ► start ► connect
//!                                                    │
//!                                                    ├──► SyncCoordinator ──► SyncService
//!                                                    │      (single-flight)
//!                                                    │
//!   session streams ──► routing handlers ──► Notifiability ──► Slack / Telegram
//!                        ($session/$symbol)     (routers)          (queued)
//!                                                                     ▲
//!                                                      pairing (/auth <totp>)
//! ```

pub mod config;
pub mod environment;
pub mod error;
pub mod factory;
pub mod registry;
pub mod routing;
pub mod session;
pub mod strategy;
pub mod sync;

#[cfg(test)]
mod testing;

pub use config::{EnvVars, EnvironmentConfig, RoutingMode, load_config, load_config_from_str};
pub use environment::Environment;
pub use error::{ConfigError, EnvironmentError, SessionError, StrategyError};
pub use factory::ExchangeFactory;
pub use registry::SessionRegistry;
pub use routing::configure_routing;
pub use session::{ExchangeSession, SessionState};
pub use strategy::{Capabilities, StrategyRegistry};
pub use sync::SyncCoordinator;
