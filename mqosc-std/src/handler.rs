//! Handlers: one subscription pattern bound to one destination template.
//!
//! A handler goes through three states:
//!
//! 1. **Unconfigured**: a [`HandlerBuilder`] holding the declarative
//!    [`HandlerConfig`] and, optionally, a [`Translate`] hook.
//! 2. **Initialized**: [`HandlerBuilder::init`] compiles the pattern and the
//!    template and validates the hook. The resulting [`Handler`] is immutable.
//! 3. **Active**: the [`Registry`] has subscribed the handler's pattern.
//!
//! A `Handler` can only be obtained through `init`, so there is no way to
//! process an event with an uncompiled pattern or template.
//!
//! [`Registry`]: crate::registry::Registry

use crate::{pattern::Pattern, template::Template};
use mqosc_core::{
    ConfigError, DynLogger, DynTranslate, Event, EventError, Level, OscMessage, OscSender,
    TemplateData, Translate, is_reserved_key,
};
use std::{fmt, sync::Arc};

/// Declarative description of one handler.
///
/// Serialized with the configuration file keys `mqtt_topic`, `osc_address`
/// and `relay_payload`; `pattern` and `destination_template` are accepted as
/// well. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct HandlerConfig {
    /// MQTT topic pattern, `+` and `*` being single-level wildcards.
    #[cfg_attr(feature = "serde", serde(rename = "mqtt_topic", alias = "pattern"))]
    pub pattern: String,
    /// OSC address template.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "osc_address", alias = "destination_template")
    )]
    pub destination_template: String,
    /// Whether the MQTT payload is forwarded with the OSC message.
    #[cfg_attr(feature = "serde", serde(default))]
    pub relay_payload: bool,
}

impl HandlerConfig {
    /// Create a config that does not relay the payload.
    pub fn new(pattern: impl Into<String>, destination_template: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            destination_template: destination_template.into(),
            relay_payload: false,
        }
    }

    /// Forward the MQTT payload with every OSC message.
    pub fn relay_payload(mut self, relay: bool) -> Self {
        self.relay_payload = relay;
        self
    }
}

/// When translate hook output is checked against the reserved capture namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCheck {
    /// Once, at init, by calling the hook with empty inputs.
    ///
    /// A hook whose key set depends on the topic or payload can slip through;
    /// captures still overwrite colliding keys at merge time.
    #[default]
    Registration,
    /// At init and again on every event; a reserved key drops the event.
    EveryEvent,
}

/// An unconfigured handler.
pub struct HandlerBuilder {
    config: HandlerConfig,
    translate: Option<DynTranslate>,
    key_check: KeyCheck,
}

impl HandlerBuilder {
    /// Start from a declarative config.
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config,
            translate: None,
            key_check: KeyCheck::default(),
        }
    }

    /// Attach a translate hook.
    pub fn translate<T: Translate>(self, hook: T) -> Self {
        self.translate_shared(Arc::new(hook))
    }

    /// Attach a shared translate hook.
    pub fn translate_shared(mut self, hook: DynTranslate) -> Self {
        self.translate = Some(hook);
        self
    }

    /// Choose when hook keys are validated.
    pub fn key_check(mut self, key_check: KeyCheck) -> Self {
        self.key_check = key_check;
        self
    }

    /// The declarative part of this handler.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Compile and validate everything the handler needs to process events.
    pub fn init(self, logger: DynLogger) -> Result<Handler, ConfigError> {
        let HandlerConfig {
            pattern,
            destination_template,
            relay_payload,
        } = self.config;

        let compiled = Pattern::compile(&pattern).map_err(|source| ConfigError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        let template = Template::compile(&destination_template)
            .and_then(|template| {
                template.check_captures(compiled.wildcard_count())?;
                Ok(template)
            })
            .map_err(|source| ConfigError::Template {
                template: destination_template.clone(),
                source,
            })?;

        let mut check_every_event = self.key_check == KeyCheck::EveryEvent;
        if let Some(hook) = &self.translate {
            match hook.translate("", "") {
                Ok(data) => {
                    if let Some(key) = data.keys().find(|key| is_reserved_key(key)) {
                        return Err(ConfigError::ReservedKey {
                            pattern,
                            key: key.clone(),
                        });
                    }
                }
                Err(err) => {
                    logger.log(
                        Level::Warn,
                        format_args!(
                            "translate hook for `{pattern}` failed on empty input ({err}), \
                             checking its keys on every event instead"
                        ),
                    );
                    check_every_event = true;
                }
            }
        }

        logger.log(
            Level::Debug,
            format_args!("initialized handler `{pattern}` -> `{destination_template}`"),
        );

        Ok(Handler {
            pattern: compiled,
            template,
            translate: self.translate,
            relay_payload,
            check_every_event,
            logger,
        })
    }
}

impl fmt::Debug for HandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBuilder")
            .field("config", &self.config)
            .field("translate", &self.translate.is_some())
            .field("key_check", &self.key_check)
            .finish()
    }
}

/// An initialized handler.
///
/// Immutable; safe to call from many threads at once. Every event gets its
/// own [`TemplateData`].
pub struct Handler {
    pattern: Pattern,
    template: Template,
    translate: Option<DynTranslate>,
    relay_payload: bool,
    check_every_event: bool,
    logger: DynLogger,
}

impl Handler {
    /// The compiled subscription pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The compiled destination template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Whether the payload is forwarded.
    pub fn relays_payload(&self) -> bool {
        self.relay_payload
    }

    /// Translate one event into an OSC message without sending it.
    pub fn process(&self, event: Event<'_>) -> Result<OscMessage, EventError> {
        let captures = self
            .pattern
            .captures(event.topic)
            .ok_or_else(|| EventError::NoMatch(event.topic.to_owned()))?;

        let aux = match &self.translate {
            Some(hook) => {
                let aux = hook
                    .translate(event.topic, &event.payload_lossy())
                    .map_err(EventError::Hook)?;
                if self.check_every_event {
                    if let Some(key) = aux.keys().find(|key| is_reserved_key(key)) {
                        return Err(EventError::ReservedKey(key.clone()));
                    }
                }
                aux
            }
            None => Default::default(),
        };

        let data = TemplateData::merge(aux, captures);
        let address = self.template.render(&data)?;

        Ok(OscMessage {
            address,
            payload: self.relay_payload.then(|| event.payload.to_vec()),
        })
    }

    /// Process one event and hand the result to `sender`.
    ///
    /// Failures are logged here and returned for reporting; they never
    /// affect other events or handlers.
    pub fn on_event(&self, event: Event<'_>, sender: &dyn OscSender) -> Result<(), EventError> {
        self.logger.log(
            Level::Debug,
            format_args!(
                "handler `{}` was triggered by message on topic `{}`",
                self.pattern, event.topic
            ),
        );

        let result = self
            .process(event)
            .and_then(|message| sender.send(&message).map_err(EventError::from));

        if let Err(err) = &result {
            let level = match err {
                EventError::NoMatch(_) => Level::Warn,
                _ => Level::Error,
            };
            self.logger.log(
                level,
                format_args!(
                    "handler `{}` dropped message on `{}`: {err}",
                    self.pattern, event.topic
                ),
            );
        }
        result
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("pattern", &self.pattern.as_str())
            .field("template", &self.template.as_str())
            .field("translate", &self.translate.is_some())
            .field("relay_payload", &self.relay_payload)
            .field("check_every_event", &self.check_every_event)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingLogger, RecordingSender};
    use mqosc_core::{AuxData, BoxError, TemplateError};

    fn configured(pattern: &str, template: &str) -> HandlerBuilder {
        HandlerBuilder::new(HandlerConfig::new(pattern, template))
    }

    fn init(builder: HandlerBuilder) -> (Result<Handler, ConfigError>, RecordingLogger) {
        let logger = RecordingLogger::new();
        (builder.init(Arc::new(logger.clone())), logger)
    }

    fn room_hook(_topic: &str, payload: &str) -> Result<AuxData, BoxError> {
        let mut data = AuxData::new();
        data.insert("value".into(), payload.trim().to_owned());
        Ok(data)
    }

    #[test]
    fn test_light_scenario() {
        let builder = configured("light/+/on", "light/{capture_1}/turn-on");
        let handler = init(builder).0.unwrap();

        let message = handler.process(Event::new("light/kitchen/on", b"ignored")).unwrap();
        assert_eq!(message.address, "light/kitchen/turn-on");
        assert_eq!(message.payload, None);
    }

    #[test]
    fn test_single_capture_round_trip() {
        let builder = configured("device/+/state", "{capture_1}");
        let handler = init(builder).0.unwrap();
        let message = handler.process(Event::new("device/37/state", b"")).unwrap();
        assert_eq!(message.address, "37");
    }

    #[test]
    fn test_relay_payload_is_unmodified() {
        let config = HandlerConfig::new("fader/+", "/fader/{capture_1}").relay_payload(true);
        let handler = init(HandlerBuilder::new(config)).0.unwrap();

        let payload = [0x00, 0xff, b'1'];
        let message = handler.process(Event::new("fader/3", &payload)).unwrap();
        assert_eq!(message.payload.as_deref(), Some(&payload[..]));
    }

    #[test]
    fn test_hook_data_is_merged() {
        let builder = configured("dimmer/+", "/dim/{capture_1}/{value}").translate(room_hook);
        let handler = init(builder).0.unwrap();

        let message = handler.process(Event::new("dimmer/2", b" 0.5 ")).unwrap();
        assert_eq!(message.address, "/dim/2/0.5");
    }

    #[test]
    fn test_reserved_key_rejected_at_init() {
        let hook = |_: &str, _: &str| -> Result<AuxData, BoxError> {
            let mut data = AuxData::new();
            data.insert("capture_1".into(), "x".into());
            Ok(data)
        };
        let builder = configured("a/+", "/{capture_1}").translate(hook);
        let err = init(builder).0.unwrap_err();
        assert!(matches!(err, ConfigError::ReservedKey { ref key, .. } if key == "capture_1"));
    }

    #[test]
    fn test_bad_pattern_and_template() {
        let (result, _) = init(configured("", "/x"));
        assert!(matches!(result, Err(ConfigError::Pattern { .. })));

        let (result, _) = init(configured("a/+", "/{x"));
        assert!(matches!(result, Err(ConfigError::Template { .. })));

        let (result, _) = init(configured("a/+", "/{capture_2}"));
        assert!(matches!(
            result,
            Err(ConfigError::Template {
                source: TemplateError::CaptureOutOfRange { wildcards: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_non_canonical_capture_fails_init() {
        let (result, _) = init(configured("a/+", "/{capture_01}"));
        assert!(matches!(
            result,
            Err(ConfigError::Template {
                source: TemplateError::InvalidCapture(ref key),
                ..
            }) if key == "capture_01"
        ));
    }

    #[test]
    fn test_data_dependent_keys_overwritten_by_captures() {
        // Passes the empty-input check, then returns a reserved key.
        let hook = |topic: &str, _: &str| -> Result<AuxData, BoxError> {
            let mut data = AuxData::new();
            if !topic.is_empty() {
                data.insert("capture_1".into(), "spoofed".into());
            }
            Ok(data)
        };
        let builder = configured("a/+", "/{capture_1}").translate(hook);
        let handler = init(builder).0.unwrap();
        let message = handler.process(Event::new("a/real", b"")).unwrap();
        assert_eq!(message.address, "/real");
    }

    #[test]
    fn test_every_event_key_check() {
        let hook = |topic: &str, _: &str| -> Result<AuxData, BoxError> {
            let mut data = AuxData::new();
            if !topic.is_empty() {
                data.insert("capture_9".into(), "spoofed".into());
            }
            Ok(data)
        };
        let builder = configured("a/+", "/{capture_1}")
            .translate(hook)
            .key_check(KeyCheck::EveryEvent);
        let handler = init(builder).0.unwrap();
        assert!(matches!(
            handler.process(Event::new("a/real", b"")),
            Err(EventError::ReservedKey(key)) if key == "capture_9"
        ));
    }

    #[test]
    fn test_sentinel_failure_falls_back_to_event_check() {
        let hook = |_: &str, payload: &str| -> Result<AuxData, BoxError> {
            if payload.is_empty() {
                return Err("empty payload".into());
            }
            let mut data = AuxData::new();
            data.insert("capture_1".into(), payload.to_owned());
            Ok(data)
        };
        let builder = configured("a/+", "/{capture_1}").translate(hook);
        let (handler, logger) = init(builder);
        let handler = handler.unwrap();

        assert!(logger.contains(Level::Warn, "failed on empty input"));
        assert!(matches!(
            handler.process(Event::new("a/b", b"x")),
            Err(EventError::ReservedKey(_))
        ));
    }

    #[test]
    fn test_hook_failure_is_event_error() {
        let hook = |_: &str, payload: &str| -> Result<AuxData, BoxError> {
            payload.parse::<f32>().map_err(|e| Box::new(e) as BoxError)?;
            Ok(AuxData::new())
        };
        let builder = configured("a/+", "/{capture_1}").translate(hook);
        let (handler, _) = init(builder);
        let handler = handler.unwrap();
        assert!(matches!(
            handler.process(Event::new("a/b", b"not a number")),
            Err(EventError::Hook(_))
        ));
    }

    #[test]
    fn test_render_failure_is_logged_and_dropped() {
        let builder = configured("a/+", "/{capture_1}/{room}");
        let (handler, logger) = init(builder);
        let handler = handler.unwrap();
        let sender = RecordingSender::new();

        let result = handler.on_event(Event::new("a/b", b""), &sender);
        assert!(matches!(result, Err(EventError::Render(_))));
        assert!(sender.messages().is_empty());
        assert!(logger.contains(Level::Error, "no value for placeholder `room`"));
    }

    #[test]
    fn test_no_match_is_warning() {
        let builder = configured("a/+", "/{capture_1}");
        let (handler, logger) = init(builder);
        let handler = handler.unwrap();
        let sender = RecordingSender::new();

        let result = handler.on_event(Event::new("b/c/d", b""), &sender);
        assert!(matches!(result, Err(EventError::NoMatch(_))));
        assert!(logger.contains(Level::Warn, "does not match"));
    }

    #[test]
    fn test_on_event_sends() {
        let builder = configured("light/+/on", "/light/{capture_1}");
        let (handler, logger) = init(builder);
        let handler = handler.unwrap();
        let sender = RecordingSender::new();

        handler.on_event(Event::new("light/hall/on", b"1"), &sender).unwrap();
        assert_eq!(sender.messages(), vec![OscMessage::new("/light/hall")]);
        assert!(logger.contains(
            Level::Debug,
            "was triggered by message on topic `light/hall/on`"
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_field_names() {
        let config: HandlerConfig = serde_json::from_str(
            r#"{ "mqtt_topic": "/light/+/on", "osc_address": "/light/{capture_1}/turn-on" }"#,
        )
        .unwrap();
        assert_eq!(config, HandlerConfig::new("/light/+/on", "/light/{capture_1}/turn-on"));

        let config: HandlerConfig = serde_json::from_str(
            r#"{ "pattern": "a/+", "destination_template": "/a", "relay_payload": true }"#,
        )
        .unwrap();
        assert!(config.relay_payload);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["mqtt_topic"], "a/+");
        assert_eq!(json["osc_address"], "/a");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_rejects_unknown_keys() {
        let result = serde_json::from_str::<HandlerConfig>(
            r#"{ "mqtt_topic": "a/+", "osc_adress": "/a" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_handler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Handler>();
    }
}
