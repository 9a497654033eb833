mod common;

use athena_core::{EventKind, OrderType, ProfitAndLossReport, Side, SubmitOrder};
use athena_environment::config::{NotificationConfig, RoutingConfig, RoutingMode};
use athena_environment::{ConfigError, EnvVars, Environment, ExchangeFactory};
use chrono::Utc;
use common::{FakeExchange, RecordingNotifier, init_tracing, order, trade};
use indexmap::IndexMap;
use rust_decimal_macros::dec;
use std::sync::Arc;

struct Fixture {
    env: Environment,
    binance: Arc<FakeExchange>,
    ftx: Arc<FakeExchange>,
    recorder: Arc<RecordingNotifier>,
}

fn fixture() -> Fixture {
    init_tracing();
    let mut env = Environment::new(ExchangeFactory::new())
        .with_env(EnvVars::from_pairs(Vec::<(String, String)>::new()));
    let binance = Arc::new(FakeExchange::new("binance"));
    let ftx = Arc::new(FakeExchange::new("ftx"));
    env.add_exchange("binance", binance.clone());
    env.add_exchange("ftx", ftx.clone());

    let recorder = Arc::new(RecordingNotifier::default());
    env.notifiability().add_notifier(recorder.clone());

    Fixture {
        env,
        binance,
        ftx,
        recorder,
    }
}

fn routes(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_session_routing_with_fallback() {
    let mut f = fixture();
    let config = NotificationConfig {
        session_channels: routes(&[("binance", "alerts-binance")]),
        routing: Some(RoutingConfig {
            trade: RoutingMode::Session,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    f.binance.stream.inner.emit_trade_update(&trade("binance", "BTCUSDT"));
    f.ftx.stream.inner.emit_trade_update(&trade("ftx", "BTCUSDT"));

    assert_eq!(
        f.recorder.channels(),
        vec![Some("alerts-binance".to_string()), None]
    );
    let sent = f.recorder.sent.lock();
    assert_eq!(sent[0].1.kind, Some(EventKind::Trade));
    assert!(sent[0].1.text.starts_with("binance BUY trade: BTCUSDT"));
}

#[test]
fn test_symbol_routing_with_fallback() {
    let mut f = fixture();
    let config = NotificationConfig {
        symbol_channels: routes(&[("BTC*", "alerts-btc")]),
        routing: Some(RoutingConfig {
            trade: RoutingMode::Symbol,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    f.binance.stream.inner.emit_trade_update(&trade("binance", "BTCUSDT"));
    f.ftx.stream.inner.emit_trade_update(&trade("ftx", "BTCUSDT"));
    f.ftx.stream.inner.emit_trade_update(&trade("ftx", "ETHUSDT"));

    assert_eq!(
        f.recorder.channels(),
        vec![
            Some("alerts-btc".to_string()),
            Some("alerts-btc".to_string()),
            None
        ]
    );
}

#[test]
fn test_silent_installs_no_handlers() {
    let mut f = fixture();
    let config = NotificationConfig {
        routing: Some(RoutingConfig::default()),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    assert_eq!(f.binance.stream.inner.trade_handler_count(), 0);
    assert_eq!(f.binance.stream.inner.order_handler_count(), 0);
    f.binance.stream.inner.emit_trade_update(&trade("binance", "BTCUSDT"));
    assert!(f.recorder.channels().is_empty());
}

#[test]
fn test_order_and_trade_policies_are_independent() {
    let mut f = fixture();
    let config = NotificationConfig {
        symbol_channels: routes(&[("ETH*", "alerts-eth")]),
        session_channels: routes(&[("ftx", "alerts-ftx")]),
        routing: Some(RoutingConfig {
            trade: RoutingMode::Silent,
            order: RoutingMode::Session,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    // One handler per session, trades untouched
    assert_eq!(f.binance.stream.inner.order_handler_count(), 1);
    assert_eq!(f.ftx.stream.inner.order_handler_count(), 1);
    assert_eq!(f.ftx.stream.inner.trade_handler_count(), 0);

    f.ftx.stream.inner.emit_order_update(&order("ftx", "ETHUSDT"));
    f.binance.stream.inner.emit_order_update(&order("binance", "ETHUSDT"));

    assert_eq!(
        f.recorder.channels(),
        vec![Some("alerts-ftx".to_string()), None]
    );
}

#[test]
fn test_routing_can_only_be_configured_once() {
    let mut f = fixture();
    let config = NotificationConfig {
        routing: Some(RoutingConfig {
            trade: RoutingMode::Symbol,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    assert!(matches!(
        f.env.configure_notification_routing(&config),
        Err(ConfigError::RoutingAlreadyConfigured)
    ));
    assert_eq!(f.binance.stream.inner.trade_handler_count(), 1);
}

#[test]
fn test_invalid_route_pattern_is_a_config_error() {
    let mut f = fixture();
    let config = NotificationConfig {
        symbol_channels: routes(&[("[BTC", "alerts-btc")]),
        ..NotificationConfig::default()
    };
    assert!(matches!(
        f.env.configure_notification_routing(&config),
        Err(ConfigError::Route(_))
    ));
}

#[test]
fn test_failed_configuration_leaves_no_rules_behind() {
    let mut f = fixture();
    let broken = NotificationConfig {
        symbol_channels: routes(&[("*", "old-catch-all")]),
        session_channels: routes(&[("binance", "old-binance")]),
        templates: IndexMap::from([(EventKind::Trade, "{{#if side}} unclosed".to_string())]),
        ..NotificationConfig::default()
    };
    assert!(matches!(
        f.env.configure_notification_routing(&broken),
        Err(ConfigError::Template(_))
    ));
    assert!(f.env.notifiability().symbol_router().is_empty());
    assert!(f.env.notifiability().session_router().is_empty());

    let fixed = NotificationConfig {
        symbol_channels: routes(&[("BTC*", "alerts-btc")]),
        routing: Some(RoutingConfig {
            trade: RoutingMode::Symbol,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&fixed).unwrap();

    f.binance.stream.inner.emit_trade_update(&trade("binance", "BTCUSDT"));
    assert_eq!(f.recorder.channels(), vec![Some("alerts-btc".to_string())]);
    assert_eq!(f.env.notifiability().symbol_router().len(), 1);
}

#[test]
fn test_render_failure_drops_only_that_event() {
    let mut f = fixture();
    let config = NotificationConfig {
        session_channels: routes(&[("*", "alerts")]),
        routing: Some(RoutingConfig {
            trade: RoutingMode::Session,
            order: RoutingMode::Session,
            ..RoutingConfig::default()
        }),
        templates: IndexMap::from([(EventKind::Trade, "{{no_such_field}}".to_string())]),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    f.binance.stream.inner.emit_trade_update(&trade("binance", "BTCUSDT"));
    f.binance.stream.inner.emit_order_update(&order("binance", "BTCUSDT"));

    let sent = f.recorder.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.kind, Some(EventKind::Order));
}

#[test]
fn test_strategy_events_use_object_routing() {
    let mut f = fixture();
    let config = NotificationConfig {
        symbol_channels: routes(&[("BTC*", "alerts-btc")]),
        routing: Some(RoutingConfig {
            submit_order: RoutingMode::Symbol,
            pnl: RoutingMode::Session,
            ..RoutingConfig::default()
        }),
        ..NotificationConfig::default()
    };
    f.env.configure_notification_routing(&config).unwrap();

    let notifiability = f.env.notifiability();
    notifiability.notify_object(&SubmitOrder {
        client_order_id: None,
        symbol: "BTCUSDT".to_string(),
        side: Side::Buy,
        order_type: OrderType::Market,
        quantity: dec!(0.5),
        price: None,
    });
    notifiability.notify_object(&ProfitAndLossReport {
        symbol: "BTCUSDT".to_string(),
        last_price: dec!(100),
        average_cost: dec!(90),
        base_position: dec!(1),
        realized_profit: dec!(5),
        unrealized_profit: dec!(10),
        num_trades: 3,
        generated_at: Utc::now(),
    });

    // $session is not available for PnL reports, they fall back to broadcast
    assert_eq!(
        f.recorder.channels(),
        vec![Some("alerts-btc".to_string()), None]
    );
    assert_eq!(f.recorder.texts()[0], "submitting BUY MARKET order: BTCUSDT 0.5");
    assert_eq!(notifiability.object_router().len(), 1);
}
