//! Error types for mqosc.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RelayError`] - Top-level error type for all relay operations
//! - [`ConfigError`] - Registration-time errors; the handler never becomes active
//! - [`EventError`] - Per-event errors, isolated to one handler and one event
//! - [`TransportError`] - Errors reported by the MQTT/OSC collaborators

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all relay operations.
#[derive(Error, Debug)]
pub enum RelayError {
    /// A handler could not be initialized.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A transport collaborator failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors raised while initializing a handler.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The subscription pattern could not be compiled.
    #[error("invalid topic pattern `{pattern}`: {source}")]
    Pattern {
        /// The pattern as configured.
        pattern: String,
        /// What is wrong with it.
        #[source]
        source: PatternError,
    },

    /// The destination template could not be compiled.
    #[error("invalid address template `{template}`: {source}")]
    Template {
        /// The template as configured.
        template: String,
        /// What is wrong with it.
        #[source]
        source: TemplateError,
    },

    /// The translate hook produces a key from the reserved capture namespace.
    #[error("translate hook for `{pattern}` returns reserved key `{key}`")]
    ReservedKey {
        /// Pattern of the offending handler.
        pattern: String,
        /// The reserved key returned by the hook.
        key: String,
    },
}

/// Errors produced by the pattern compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern string is empty.
    #[error("pattern is empty")]
    Empty,

    /// The `+` wildcard shares its segment with other characters.
    #[error("segment `{0}` mixes the `+` wildcard with other characters")]
    MixedWildcard(String),

    /// The multi-level wildcard is not supported.
    #[error("segment `{0}` uses the multi-level wildcard `#`")]
    MultiLevel(String),
}

/// Errors produced by the template compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` without a closing `}`.
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    /// A `}` without an opening `{`.
    #[error("unmatched `}}` at byte {0}")]
    UnmatchedClose(usize),

    /// `{}` names no key.
    #[error("empty placeholder at byte {0}")]
    EmptyPlaceholder(usize),

    /// The placeholder key contains characters outside `[A-Za-z0-9_.-]`.
    #[error("invalid placeholder key `{0}`")]
    InvalidKey(String),

    /// A reserved capture key that is not `capture_<n>` with `n >= 1`.
    #[error("invalid capture placeholder `{0}`")]
    InvalidCapture(String),

    /// A capture placeholder referring to a wildcard the pattern does not have.
    #[error("placeholder `{key}` refers past the {wildcards} wildcard(s) of the pattern")]
    CaptureOutOfRange {
        /// The placeholder key.
        key: String,
        /// Number of wildcards in the pattern.
        wildcards: usize,
    },
}

/// Errors raised while rendering a compiled template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No value exists for the placeholder.
    #[error("no value for placeholder `{0}`")]
    Missing(String),
}

/// Errors raised while processing a single event in a single handler.
#[derive(Error, Debug)]
pub enum EventError {
    /// The topic does not fit the handler's pattern.
    #[error("topic `{0}` does not match the handler pattern")]
    NoMatch(String),

    /// The translate hook failed.
    #[error("translate hook failed: {0}")]
    Hook(#[source] BoxError),

    /// The translate hook returned a reserved key at event time.
    #[error("translate hook returned reserved key `{0}`")]
    ReservedKey(String),

    /// The address template could not be rendered.
    #[error("failed to render address: {0}")]
    Render(#[from] RenderError),

    /// The outbound client refused the message.
    #[error("failed to send: {0}")]
    Send(#[from] TransportError),
}

/// Errors reported by transport collaborators.
#[derive(Error, Debug)]
pub enum TransportError {
    /// A subscription could not be established.
    #[error("subscription to `{pattern}` failed")]
    Subscribe {
        /// Pattern passed to the transport.
        pattern: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// A message could not be sent.
    #[error("sending to `{address}` failed")]
    Send {
        /// Destination address.
        address: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// The handlers are already subscribed, or a subscription round is running.
    #[error("handlers are already subscribed")]
    AlreadySubscribed,

    /// The connection is unavailable.
    #[error(transparent)]
    Connection(BoxError),
}

impl From<BoxError> for TransportError {
    fn from(err: BoxError) -> Self {
        TransportError::Connection(err)
    }
}

impl From<BoxError> for EventError {
    fn from(err: BoxError) -> Self {
        EventError::Hook(err)
    }
}
