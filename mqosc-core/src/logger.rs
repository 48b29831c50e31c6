//! Logging collaborator.
//!
//! The engine never logs through global state. Every component that reports
//! something receives an explicit [`Logger`] at construction time.

use std::{fmt, sync::Arc};

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace,
    /// Per-event diagnostics.
    Debug,
    /// Lifecycle information.
    Info,
    /// Recoverable problems, e.g. a skipped handler.
    Warn,
    /// A dropped event.
    Error,
    /// The whole relay is non-functional. Never raised by the engine itself.
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        })
    }
}

/// Sink for formatted log messages.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Logger`",
    label = "missing `Logger` implementation",
    note = "Implement `Logger`, or pass a closure `Fn(Level, fmt::Arguments<'_>)`."
)]
pub trait Logger: Send + Sync + 'static {
    /// Record one message.
    fn log(&self, level: Level, message: fmt::Arguments<'_>);
}

impl<F> Logger for F
where
    F: Fn(Level, fmt::Arguments<'_>) + Send + Sync + 'static,
{
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        (self)(level, message)
    }
}

/// Shared, type-erased logger.
pub type DynLogger = Arc<dyn Logger>;
