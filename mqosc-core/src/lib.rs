//! # mqosc-core
//!
//! Core traits and types for the mqosc MQTT to OSC relay.
//!
//! This crate has minimal dependencies and is what transport adapters and
//! translate hooks depend on. The matching and templating engine lives in
//! `mqosc-std`.
//!
//! # Boundaries
//!
//! - [`Translate`]: caller-supplied auxiliary data for address templates
//! - [`Subscriber`] / [`OscSender`]: the inbound and outbound transports
//! - [`Logger`]: the logging sink, injected explicitly
//!
//! # Error Types
//!
//! - [`RelayError`] - Top-level error type
//! - [`ConfigError`] - Handler initialization errors
//! - [`EventError`] - Per-event errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod data;
mod error;
mod logger;
mod message;
mod transport;
mod translate;

// Re-exports
pub use data::{AuxData, RESERVED_PREFIX, TemplateData, capture_key, is_reserved_key};
pub use error::{
    BoxError, ConfigError, EventError, PatternError, RelayError, RenderError, TemplateError,
    TransportError,
};
pub use logger::{DynLogger, Level, Logger};
pub use message::{Event, OscMessage};
pub use translate::{DynTranslate, Translate};
pub use transport::{Delivery, OscSender, Subscriber};
