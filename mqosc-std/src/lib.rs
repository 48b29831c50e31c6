//! # mqosc-std
//!
//! The topic-pattern matching and address-templating engine of mqosc.
//!
//! This crate provides:
//! - **Pattern compilation**: [`Pattern`] and its [`Captures`]
//! - **Templates**: [`Template`] compile and render
//! - **Handlers**: [`HandlerBuilder`] → [`Handler`]
//! - **Dispatch**: [`Registry`], [`RegistryBuilder`], [`InitPolicy`]
//! - **Loggers**: `tracing`-backed and no-op
//!
//! ```rust
//! use std::sync::Arc;
//! use mqosc_core::Event;
//! use mqosc_std::{
//!     HandlerBuilder, HandlerConfig, Registry, logging::NullLogger, testing::RecordingSender,
//! };
//!
//! let registry = Registry::builder()
//!     .register(HandlerBuilder::new(HandlerConfig::new(
//!         "light/+/on",
//!         "light/{capture_1}/turn-on",
//!     )))
//!     .build(Arc::new(NullLogger))
//!     .unwrap();
//!
//! let sender = RecordingSender::new();
//! registry.dispatch(Event::new("light/kitchen/on", b""), &sender);
//! assert_eq!(sender.addresses(), vec!["light/kitchen/turn-on"]);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use mqosc_core;

// Modules
pub mod handler;
pub mod logging;
pub mod pattern;
pub mod registry;
pub mod template;
pub mod testing;

pub use handler::{Handler, HandlerBuilder, HandlerConfig, KeyCheck};
pub use pattern::{Captures, Pattern};
pub use registry::{DispatchReport, InitPolicy, Registry, RegistryBuilder, SkippedHandler};
pub use template::Template;
