mod credentials;
mod loader;
mod types;

pub use credentials::{EnvVars, resolve_credentials, resolve_redis};
pub use loader::{load_config, load_config_from_str};
pub use types::{
    EnvironmentConfig, JsonPersistenceConfig, NotificationConfig, PersistenceConfig,
    RedisPersistenceConfig, RoutingConfig, RoutingMode, SessionConfig, SlackNotificationConfig, SyncConfig,
    TelegramNotificationConfig,
};
