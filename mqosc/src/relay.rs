//! The relay: configuration, hooks and logger bound to a dispatch registry.

use crate::config::{MqttConfig, RelayConfig};
use mqosc_core::{
    ConfigError, DynLogger, DynTranslate, Event, Level, OscSender, RelayError, Subscriber,
    Translate, TransportError,
};
use mqosc_std::{
    DispatchReport, HandlerBuilder, InitPolicy, KeyCheck, Registry, logging::TracingLogger,
};
use std::{collections::HashMap, sync::Arc};

/// Forwards MQTT publications to OSC.
///
/// Built from a [`RelayConfig`] through [`Relay::builder`]. Every handler is
/// initialized when the relay is built; [`Relay::start`] subscribes them.
///
/// ```rust
/// use std::sync::Arc;
/// use mqosc::{Relay, RelayConfig, HandlerConfig};
/// use mqosc::testing::{LocalBus, RecordingSender};
///
/// let config = RelayConfig {
///     handlers: vec![HandlerConfig::new("light/+/on", "/light/{capture_1}/turn-on")],
///     ..RelayConfig::default()
/// };
/// let relay = Relay::builder(config).build().unwrap();
///
/// let bus = LocalBus::new();
/// let sender = Arc::new(RecordingSender::new());
/// relay.start(&bus, sender.clone()).unwrap();
///
/// bus.publish("light/kitchen/on", b"1");
/// assert_eq!(sender.addresses(), vec!["/light/kitchen/turn-on"]);
/// ```
pub struct Relay {
    mqtt: MqttConfig,
    registry: Registry,
    logger: DynLogger,
}

impl Relay {
    /// Start building a relay from `config`.
    pub fn builder(config: RelayConfig) -> RelayBuilder {
        RelayBuilder::new(config)
    }

    /// Broker connection settings, for the transport implementation.
    pub fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    /// The handler registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Subscribe every handler and send its messages through `sender`.
    ///
    /// A subscription failure leaves the relay non-functional; it is logged
    /// as fatal and returned. Starting a running relay is refused with
    /// [`TransportError::AlreadySubscribed`].
    pub fn start(
        &self,
        subscriber: &dyn Subscriber,
        sender: Arc<dyn OscSender>,
    ) -> Result<(), RelayError> {
        self.logger.log(
            Level::Info,
            format_args!(
                "listening to MQTT broker {} with {} handler(s)",
                self.mqtt.broker_url(),
                self.registry.len()
            ),
        );
        self.registry.activate(subscriber, sender).map_err(|err| {
            match err {
                TransportError::AlreadySubscribed => self
                    .logger
                    .log(Level::Warn, format_args!("relay is already running")),
                _ => self
                    .logger
                    .log(Level::Fatal, format_args!("relay cannot start: {err}")),
            }
            RelayError::Transport(err)
        })
    }

    /// Run one event through every matching handler without a transport.
    pub fn dispatch(&self, event: Event<'_>, sender: &dyn OscSender) -> DispatchReport {
        self.registry.dispatch(event, sender)
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("mqtt", &self.mqtt)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`Relay`].
pub struct RelayBuilder {
    config: RelayConfig,
    translators: HashMap<String, DynTranslate>,
    key_check: KeyCheck,
    policy: InitPolicy,
    logger: Option<DynLogger>,
}

impl RelayBuilder {
    /// Create a builder for `config`.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            translators: HashMap::new(),
            key_check: KeyCheck::default(),
            policy: InitPolicy::default(),
            logger: None,
        }
    }

    /// Attach a translate hook to every handler configured with `pattern`.
    pub fn translate<T: Translate>(self, pattern: impl Into<String>, hook: T) -> Self {
        self.translate_shared(pattern, Arc::new(hook))
    }

    /// Attach a shared translate hook to every handler configured with `pattern`.
    pub fn translate_shared(mut self, pattern: impl Into<String>, hook: DynTranslate) -> Self {
        self.translators.insert(pattern.into(), hook);
        self
    }

    /// When hook output is validated against the reserved capture keys.
    pub fn key_check(mut self, key_check: KeyCheck) -> Self {
        self.key_check = key_check;
        self
    }

    /// Abort on the first bad handler, or skip it.
    pub fn init_policy(mut self, policy: InitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Log through `logger` instead of the default [`TracingLogger`].
    pub fn logger(mut self, logger: DynLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Initialize every handler.
    pub fn build(self) -> Result<Relay, ConfigError> {
        let logger: DynLogger = match self.logger {
            Some(logger) => logger,
            None => Arc::new(TracingLogger::named("mqosc")),
        };

        for pattern in self.translators.keys() {
            if !self.config.handlers.iter().any(|h| &h.pattern == pattern) {
                logger.log(
                    Level::Warn,
                    format_args!("translate hook for `{pattern}` matches no configured handler"),
                );
            }
        }

        let mut registry = Registry::builder().policy(self.policy);
        for config in self.config.handlers {
            let hook = self.translators.get(&config.pattern).cloned();
            let mut handler = HandlerBuilder::new(config).key_check(self.key_check);
            if let Some(hook) = hook {
                handler = handler.translate_shared(hook);
            }
            registry = registry.register(handler);
        }

        Ok(Relay {
            mqtt: self.config.mqtt,
            registry: registry.build(logger.clone())?,
            logger,
        })
    }
}

impl std::fmt::Debug for RelayBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayBuilder")
            .field("config", &self.config)
            .field("translators", &self.translators.keys().collect::<Vec<_>>())
            .field("key_check", &self.key_check)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mqosc_core::{AuxData, BoxError};
    use mqosc_std::{
        HandlerConfig,
        testing::{LocalBus, RecordingLogger, RecordingSender},
    };

    fn config(handlers: Vec<HandlerConfig>) -> RelayConfig {
        RelayConfig {
            handlers,
            ..RelayConfig::default()
        }
    }

    #[test]
    fn test_translators_attach_by_pattern() {
        let hook = |_: &str, payload: &str| -> Result<AuxData, BoxError> {
            let mut data = AuxData::new();
            data.insert("level".into(), payload.to_owned());
            Ok(data)
        };
        let logger = RecordingLogger::new();
        let relay = Relay::builder(config(vec![
            HandlerConfig::new("dim/+", "/dim/{capture_1}/{level}"),
            HandlerConfig::new("sw/+", "/sw/{capture_1}"),
        ]))
        .translate("dim/+", hook)
        .translate("unused/+", hook)
        .logger(Arc::new(logger.clone()))
        .build()
        .unwrap();

        let sender = RecordingSender::new();
        relay.dispatch(Event::new("dim/3", b"80"), &sender);
        relay.dispatch(Event::new("sw/1", b"on"), &sender);
        assert_eq!(sender.addresses(), vec!["/dim/3/80", "/sw/1"]);
        assert!(logger.contains(Level::Warn, "`unused/+` matches no configured handler"));
    }

    #[test]
    fn test_init_policy_is_explicit() {
        let handlers = vec![
            HandlerConfig::new("good/+", "/good/{capture_1}"),
            HandlerConfig::new("bad/+", "/bad/{capture_3}"),
        ];

        let aborted = Relay::builder(config(handlers.clone()))
            .logger(Arc::new(RecordingLogger::new()))
            .build();
        assert!(matches!(aborted, Err(ConfigError::Template { .. })));

        let relay = Relay::builder(config(handlers))
            .init_policy(InitPolicy::Skip)
            .logger(Arc::new(RecordingLogger::new()))
            .build()
            .unwrap();
        assert_eq!(relay.registry().len(), 1);
        assert_eq!(relay.registry().skipped()[0].pattern, "bad/+");
    }

    #[test]
    fn test_start_failure_is_fatal() {
        let logger = RecordingLogger::new();
        let relay = Relay::builder(config(vec![HandlerConfig::new("a/+", "/a")]))
            .logger(Arc::new(logger.clone()))
            .build()
            .unwrap();
        let bus = LocalBus::new();
        bus.refuse("a/+");

        let result = relay.start(&bus, Arc::new(RecordingSender::new()));
        assert!(matches!(result, Err(RelayError::Transport(_))));
        assert!(logger.contains(Level::Fatal, "relay cannot start"));
        assert!(!relay.registry().is_active());
    }

    #[test]
    fn test_second_start_is_refused() {
        let logger = RecordingLogger::new();
        let relay = Relay::builder(config(vec![HandlerConfig::new("a/+", "/a/{capture_1}")]))
            .logger(Arc::new(logger.clone()))
            .build()
            .unwrap();
        let bus = LocalBus::new();
        let sender = Arc::new(RecordingSender::new());

        relay.start(&bus, sender.clone()).unwrap();
        let again = relay.start(&bus, sender.clone());
        assert!(matches!(
            again,
            Err(RelayError::Transport(TransportError::AlreadySubscribed))
        ));
        assert!(logger.contains(Level::Warn, "already running"));
        assert!(logger.messages(Level::Fatal).is_empty());

        bus.publish("a/1", b"");
        assert_eq!(sender.addresses(), vec!["/a/1"]);
    }

    #[test]
    fn test_start_logs_broker() {
        let logger = RecordingLogger::new();
        let relay = Relay::builder(config(vec![HandlerConfig::new("a/+", "/a")]))
            .logger(Arc::new(logger.clone()))
            .build()
            .unwrap();

        relay
            .start(&LocalBus::new(), Arc::new(RecordingSender::new()))
            .unwrap();
        assert!(logger.contains(Level::Info, "tcp://127.0.0.1:1883 with 1 handler(s)"));
        assert!(relay.registry().is_active());
    }
}
