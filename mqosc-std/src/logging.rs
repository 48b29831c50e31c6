//! Logger implementations.
//!
//! - [`TracingLogger`] forwards to the `tracing` crate (feature `tracing`).
//! - [`NullLogger`] drops everything.

use mqosc_core::{Level, Logger};
use std::fmt;

/// A logger that emits `tracing` events.
///
/// `Fatal` has no `tracing` counterpart and is emitted at error level with
/// `fatal = true`. Without the `tracing` feature every message is dropped.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use mqosc_std::logging::TracingLogger;
///
/// let logger = Arc::new(TracingLogger::named("relay"));
/// let registry = builder.build(logger)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    name: &'static str,
}

impl TracingLogger {
    /// Create a new `TracingLogger` with a default name.
    pub const fn new() -> Self {
        Self { name: "mqosc" }
    }

    /// Create a new `TracingLogger` with a custom name.
    ///
    /// The name is attached to every event as the `relay` field.
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to every event.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        #[cfg(feature = "tracing")]
        {
            let relay = self.name;
            match level {
                Level::Trace => tracing::trace!(relay, "{message}"),
                Level::Debug => tracing::debug!(relay, "{message}"),
                Level::Info => tracing::info!(relay, "{message}"),
                Level::Warn => tracing::warn!(relay, "{message}"),
                Level::Error => tracing::error!(relay, "{message}"),
                Level::Fatal => tracing::error!(relay, fatal = true, "{message}"),
            }
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, level, message); // Suppress unused warnings
        }
    }
}

/// A logger that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: fmt::Arguments<'_>) {}
}
