use athena_core::SyncStatus;
use athena_notify::{ErrorLogLayer, Notifiability, QueuedNotifier, SlackConfig, SlackDeliverer};
use athena_pairing::{Interaction, TelegramBot, TotpProvider, start_pairing};
use athena_persistence::PersistenceFacade;
use athena_ports::{Exchange, SyncService};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{
    EnvVars, EnvironmentConfig, NotificationConfig, PersistenceConfig, SessionConfig,
    resolve_credentials, resolve_redis,
};
use crate::error::{ConfigError, EnvironmentError, SessionError};
use crate::factory::ExchangeFactory;
use crate::registry::SessionRegistry;
use crate::routing::configure_routing;
use crate::session::ExchangeSession;
use crate::strategy::StrategyRegistry;
use crate::sync::SyncCoordinator;

const SLACK_TOKEN: &str = "SLACK_TOKEN";
const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const TELEGRAM_BOT_AUTH_TOKEN: &str = "TELEGRAM_BOT_AUTH_TOKEN";
const NOTIFICATION_QUEUE_CAPACITY: usize = 256;

/// Live exchange sessions plus everything wired around them
pub struct Environment {
    sessions: SessionRegistry,
    factory: ExchangeFactory,
    env: EnvVars,
    persistence: PersistenceFacade,
    notifiability: Arc<Notifiability>,
    sync: SyncCoordinator,
    strategies: StrategyRegistry,
    start_time: DateTime<Utc>,
    routing_configured: bool,
    pairing: Option<Arc<Interaction>>,
    error_log: ErrorLogLayer,
    tasks: Vec<JoinHandle<()>>,
}

impl Environment {
    pub fn new(factory: ExchangeFactory) -> Self {
        Environment {
            sessions: SessionRegistry::new(),
            factory,
            env: EnvVars::process(),
            persistence: PersistenceFacade::new(),
            notifiability: Arc::new(Notifiability::new()),
            sync: SyncCoordinator::new(),
            strategies: StrategyRegistry::new(),
            start_time: Utc::now(),
            routing_configured: false,
            pairing: None,
            error_log: ErrorLogLayer::new(),
            tasks: Vec::new(),
        }
    }

    /// Replace the process environment as the source of secrets
    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    /// Apply a whole configuration file: persistence, sessions, notifiers and
    /// routing, then the sync checkpoint override
    pub fn configure(&mut self, config: &EnvironmentConfig) -> Result<(), ConfigError> {
        if let Some(persistence) = &config.persistence {
            self.configure_persistence(persistence)?;
        }
        self.configure_exchange_sessions(config)?;
        self.configure_notification_system(config)?;
        if let Some(since) = config.sync.since {
            self.set_sync_start_time(since);
        }
        Ok(())
    }

    // ---- Sessions ----

    pub fn session(&self, name: &str) -> Option<Arc<ExchangeSession>> {
        self.sessions.get(name)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn select_sessions(&self, names: &[&str]) -> BTreeMap<String, Arc<ExchangeSession>> {
        self.sessions.select(names)
    }

    pub fn add_exchange_session(
        &mut self,
        name: impl Into<String>,
        session: ExchangeSession,
    ) -> Arc<ExchangeSession> {
        self.sessions.add(name, session)
    }

    /// Add a session named `name` around an already built exchange
    pub fn add_exchange(&mut self, name: &str, exchange: Arc<dyn Exchange>) -> Arc<ExchangeSession> {
        self.sessions.add(name, ExchangeSession::new(name, exchange))
    }

    /// Sessions from config, or from `<EXCHANGE>_API_KEY` variables when
    /// none are configured
    pub fn configure_exchange_sessions(&mut self, config: &EnvironmentConfig) -> Result<(), ConfigError> {
        if config.sessions.is_empty() {
            return self.add_exchanges_from_env();
        }
        self.add_exchanges_from_config(&config.sessions)
    }

    /// One session per supported exchange with an API key in the environment
    pub fn add_exchanges_from_env(&mut self) -> Result<(), ConfigError> {
        for name in self.factory.names() {
            let config = SessionConfig::new(&name);
            if self.env.get(&format!("{}_API_KEY", config.env_prefix())).is_none() {
                continue;
            }

            tracing::info!(exchange = %name, "found exchange credentials in environment");
            let session = self.session_from_config(&name, &config)?;
            self.sessions.add(name, session);
        }
        Ok(())
    }

    pub fn add_exchanges_from_config(
        &mut self,
        sessions: &IndexMap<String, SessionConfig>,
    ) -> Result<(), ConfigError> {
        for (name, config) in sessions {
            let session = self.session_from_config(name, config)?;
            self.sessions.add(name.clone(), session);
        }
        Ok(())
    }

    /// Build a session: resolve credentials, create the exchange and switch
    /// it into the configured margin mode
    pub fn session_from_config(
        &self,
        name: &str,
        config: &SessionConfig,
    ) -> Result<ExchangeSession, ConfigError> {
        if !self.factory.supports(&config.exchange) {
            return Err(ConfigError::UnknownExchange(config.exchange.clone()));
        }

        let margin = config.margin_mode(name)?;
        let credentials = resolve_credentials(name, config, &self.env)?;
        let exchange = self.factory.build(&config.exchange, credentials.as_ref())?;

        if margin.is_margin() {
            let margin_exchange = exchange
                .as_margin()
                .ok_or_else(|| ConfigError::MarginNotSupported(config.exchange.clone()))?;
            match margin.isolated_symbol() {
                Some(symbol) => margin_exchange.use_isolated_margin(symbol),
                None => margin_exchange.use_margin(),
            }
        }

        let session = ExchangeSession::new(name, exchange)
            .with_credentials(credentials)
            .with_env_var_prefix(config.env_var_prefix.clone())
            .with_public_only(config.public_only)
            .with_margin(margin);
        for subscription in &config.subscriptions {
            session.subscribe(
                subscription.channel,
                &subscription.symbol,
                subscription.options.clone(),
            );
        }

        tracing::debug!(session = name, exchange = %config.exchange, "exchange session created");
        Ok(session)
    }

    // ---- Persistence ----

    /// Enable the configured backends; Redis is preferred over JSON
    pub fn configure_persistence(&mut self, config: &PersistenceConfig) -> Result<(), ConfigError> {
        if let Some(redis) = &config.redis {
            self.persistence.configure_redis(resolve_redis(redis, &self.env)?)?;
        }
        if let Some(json) = &config.json {
            self.persistence.configure_json(&json.directory)?;
        }
        Ok(())
    }

    pub fn persistence(&self) -> &PersistenceFacade {
        &self.persistence
    }

    // ---- Notifications ----

    pub fn notifiability(&self) -> &Arc<Notifiability> {
        &self.notifiability
    }

    /// Layer to compose into the process subscriber; it forwards ERROR
    /// events once a Slack `error_channel` is configured.
    pub fn error_log_layer(&self) -> ErrorLogLayer {
        self.error_log.clone()
    }

    /// Operator pairing of the Telegram bot, when one is configured
    pub fn pairing(&self) -> Option<&Arc<Interaction>> {
        self.pairing.as_ref()
    }

    /// Set up Slack and Telegram notifiers, then the routing policy.
    ///
    /// Spawns dispatcher and bot tasks, so it must run inside a tokio runtime.
    pub fn configure_notification_system(&mut self, config: &EnvironmentConfig) -> Result<(), ConfigError> {
        let notifications = config.notifications.as_ref();

        if let (Some(token), Some(slack)) = (
            self.env.get(SLACK_TOKEN),
            notifications.and_then(|n| n.slack.as_ref()),
        ) {
            tracing::debug!(channel = %slack.default_channel, "adding slack notifier");
            let deliverer = SlackDeliverer::new(SlackConfig::new(token, &slack.default_channel));
            let (notifier, task) = QueuedNotifier::spawn(deliverer, NOTIFICATION_QUEUE_CAPACITY);
            let notifier = Arc::new(notifier);
            self.notifiability.add_notifier(notifier.clone());
            self.tasks.push(task);

            if let Some(channel) = slack.error_channel.as_deref().filter(|c| !c.is_empty()) {
                tracing::debug!(%channel, "forwarding error logs to slack");
                self.error_log.attach(notifier, channel);
            }
        }

        if let Some(token) = self.env.get(TELEGRAM_BOT_TOKEN) {
            let telegram = notifications
                .and_then(|n| n.telegram.clone())
                .unwrap_or_default();
            let bot = TelegramBot::new(token, Duration::from_secs(telegram.poll_timeout_secs))?;

            let auth_token = self.env.get(TELEGRAM_BOT_AUTH_TOKEN);
            if auth_token.is_some() {
                tracing::debug!("telegram bot auth token is set, accepting it for pairing");
            }

            let handle = start_pairing(
                "telegram",
                Arc::new(bot),
                self.persistence.get(),
                Arc::new(TotpProvider::new()),
                auth_token,
                &telegram.artifact_dir,
            )?;

            self.notifiability.add_notifier(Arc::new(handle.notifier));
            self.tasks.extend(handle.tasks);
            self.pairing = Some(handle.interaction);
        }

        if let Some(notifications) = notifications {
            self.configure_notification_routing(notifications)?;
        }
        Ok(())
    }

    /// Install the routing policy on every registered session.
    ///
    /// Can only be done once; sessions added afterwards get no handlers.
    pub fn configure_notification_routing(&mut self, config: &NotificationConfig) -> Result<(), ConfigError> {
        if self.routing_configured {
            return Err(ConfigError::RoutingAlreadyConfigured);
        }
        configure_routing(&self.notifiability, &self.sessions, config)?;
        self.routing_configured = true;
        Ok(())
    }

    // ---- Strategies ----

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn strategies_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.strategies
    }

    // ---- Time ----

    pub fn set_start_time(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.start_time = time;
        self
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Override the sync checkpoint (one year before start by default)
    pub fn set_sync_start_time(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.sync.set_since(time);
        self
    }

    pub fn sync_start_time(&self) -> DateTime<Utc> {
        self.sync.since()
    }

    // ---- Lifecycle ----

    /// Initialize every session; already initialized sessions are skipped
    pub async fn init(&self) -> Result<(), EnvironmentError> {
        for (name, session) in self.sessions.iter() {
            match session.init().await {
                Ok(()) => tracing::info!(session = name, "session initialized"),
                Err(SessionError::AlreadyInitialized(_)) => {
                    tracing::debug!(session = name, "session already initialized, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Prepare the symbols of every session
    pub async fn start(&self) -> Result<(), EnvironmentError> {
        for (_, session) in self.sessions.iter() {
            session.init_symbols().await?;
        }
        Ok(())
    }

    /// Connect sessions one after another; the first failure aborts.
    ///
    /// Sessions without subscriptions are skipped.
    pub async fn connect(&self) -> Result<(), EnvironmentError> {
        for (name, session) in self.sessions.iter() {
            if session.subscriptions().is_empty() {
                tracing::warn!(session = name, "exchange session has no subscriptions, skipping");
                continue;
            }
            session.connect().await?;
        }
        Ok(())
    }

    // ---- Sync ----

    pub fn set_sync_service(&mut self, service: Arc<dyn SyncService>) {
        self.sync.set_service(service);
    }

    /// Backfill every session, fail-fast
    pub async fn sync(&self) -> Result<(), EnvironmentError> {
        self.sync.sync_all(&self.sessions).await
    }

    pub async fn sync_session(
        &self,
        session: &ExchangeSession,
        symbols: &[String],
    ) -> Result<(), EnvironmentError> {
        self.sync.sync_session(session, symbols).await
    }

    pub fn is_syncing(&self) -> SyncStatus {
        self.sync.status()
    }

    /// Close every session and stop background tasks
    pub async fn shutdown(&mut self) {
        for (name, session) in self.sessions.iter() {
            if let Err(e) = session.close().await {
                tracing::warn!(session = name, "failed to close session: {}", e);
            }
        }
        self.error_log.detach();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        tracing::info!("environment shut down");
    }
}
