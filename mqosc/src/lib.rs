//! # mqosc - MQTT to OSC relay
//!
//! `mqosc` forwards MQTT publications to OSC addresses. Each handler binds a
//! topic pattern with single-level wildcards (`+` or `*`) to an OSC address
//! template; wildcard captures are available in the template as
//! `{capture_1}`, `{capture_2}`, ...
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mqosc::prelude::*;
//! use mqosc::testing::RecordingSender;
//!
//! let config = RelayConfig {
//!     handlers: vec![
//!         HandlerConfig::new("zone/+/sensor/+", "/zone/{capture_1}/{capture_2}/{unit}")
//!             .relay_payload(true),
//!     ],
//!     ..RelayConfig::default()
//! };
//!
//! let relay = Relay::builder(config)
//!     .translate("zone/+/sensor/+", |_topic: &str, _payload: &str| -> Result<AuxData, BoxError> {
//!         let mut data = AuxData::new();
//!         data.insert("unit".into(), "celsius".into());
//!         Ok(data)
//!     })
//!     .build()
//!     .unwrap();
//!
//! let sender = RecordingSender::new();
//! relay.dispatch(Event::new("zone/A/sensor/12", b"21.5"), &sender);
//!
//! let sent = sender.messages();
//! assert_eq!(sent[0].address, "/zone/A/12/celsius");
//! assert_eq!(sent[0].payload.as_deref(), Some(&b"21.5"[..]));
//! ```
//!
//! ## Boundaries
//!
//! The relay neither connects to a broker nor sends UDP packets itself. It
//! consumes a [`Subscriber`] for the MQTT side and an [`OscSender`] for the
//! OSC side, and logs through an injected [`Logger`].
//!
//! ## Observability
//!
//! With the default `tracing` feature the relay logs through
//! [`TracingLogger`](mqosc_std::logging::TracingLogger). Library code never
//! installs a global subscriber; binaries do that at the process boundary.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod config;
mod relay;

pub use config::{ConfigFileError, MqttConfig, RelayConfig};
pub use relay::{Relay, RelayBuilder};

pub use mqosc_core::{
    // Data
    AuxData,
    // Error types
    BoxError,
    ConfigError,
    // Transport
    Delivery,
    DynLogger,
    DynTranslate,
    // Messages
    Event,
    EventError,
    // Logging
    Level,
    Logger,
    OscMessage,
    OscSender,
    PatternError,
    RESERVED_PREFIX,
    RelayError,
    RenderError,
    Subscriber,
    TemplateData,
    TemplateError,
    // Hook
    Translate,
    TransportError,
    capture_key,
    is_reserved_key,
};

// Engine
pub use mqosc_std::{
    Captures, DispatchReport, Handler, HandlerBuilder, HandlerConfig, InitPolicy, KeyCheck,
    Pattern, Registry, RegistryBuilder, SkippedHandler, Template,
};

/// Logger implementations.
pub mod logging {
    pub use mqosc_std::logging::{NullLogger, TracingLogger};
}

/// Testing utilities.
pub mod testing {
    pub use mqosc_std::testing::{LocalBus, RecordingLogger, RecordingSender};
}

/// Prelude module - common imports for mqosc.
///
/// # Usage
///
/// ```rust,ignore
/// use mqosc::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AuxData, BoxError, ConfigError, Event, EventError, HandlerConfig, InitPolicy, KeyCheck,
        Level, Logger, OscMessage, OscSender, Relay, RelayConfig, Subscriber, Translate,
    };
}
