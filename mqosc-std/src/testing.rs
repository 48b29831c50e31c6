//! Testing utilities for mqosc.
//!
//! In-memory stand-ins for the collaborators the relay consumes, so handlers
//! and registries can be exercised without a broker or an OSC peer.
//!
//! # Features
//!
//! - [`RecordingLogger`]: A logger that keeps every message
//! - [`RecordingSender`]: An OSC sender that records messages and can be told to fail
//! - [`LocalBus`]: An in-process subscriber that routes with [`Pattern`]

use crate::pattern::Pattern;
use mqosc_core::{
    Delivery, Event, Level, Logger, OscMessage, OscSender, Subscriber, TransportError,
};
use std::{
    fmt,
    sync::{Arc, Mutex},
};

// ============================================================================
// Recording Logger
// ============================================================================

/// A logger that records all messages it receives.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mqosc_core::{Level, Logger};
/// use mqosc_std::testing::RecordingLogger;
///
/// let logger = RecordingLogger::new();
/// let shared: Arc<dyn Logger> = Arc::new(logger.clone());
/// shared.log(Level::Warn, format_args!("skipped {}", 1));
///
/// assert!(logger.contains(Level::Warn, "skipped 1"));
/// ```
#[derive(Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLogger {
    /// Create an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the recorded entries.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether a message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// Clear all recorded entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}

// ============================================================================
// Recording Sender
// ============================================================================

/// An OSC sender that records messages.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingSender {
    messages: Arc<Mutex<Vec<OscMessage>>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl RecordingSender {
    /// Create a new sender that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with `error`.
    pub fn set_error(&self, error: impl Into<String>) {
        *self.fail_with.lock().unwrap() = Some(error.into());
    }

    /// Accept sends again.
    pub fn clear_error(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    /// Get a copy of the sent messages.
    pub fn messages(&self) -> Vec<OscMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Addresses of the sent messages, in order.
    pub fn addresses(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.address.clone())
            .collect()
    }
}

impl OscSender for RecordingSender {
    fn send(&self, message: &OscMessage) -> Result<(), TransportError> {
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(TransportError::Send {
                address: message.address.clone(),
                source: err.into(),
            });
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Local Bus
// ============================================================================

/// An in-process publish/subscribe bus.
///
/// Subscriptions are matched with [`Pattern`], publications are delivered
/// synchronously on the publishing thread.
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use mqosc_core::{Event, Subscriber};
/// use mqosc_std::testing::LocalBus;
///
/// let bus = LocalBus::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// bus.subscribe("light/+/on", Arc::new(move |event: Event<'_>| {
///     sink.lock().unwrap().push(event.topic.to_owned());
/// }))
/// .unwrap();
///
/// assert_eq!(bus.publish("light/hall/on", b""), 1);
/// assert_eq!(bus.publish("light/hall/off", b""), 0);
/// assert_eq!(*seen.lock().unwrap(), vec!["light/hall/on".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct LocalBus {
    subscriptions: Arc<Mutex<Vec<(Pattern, Delivery)>>>,
    refuse: Arc<Mutex<Vec<String>>>,
}

impl LocalBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subscriptions to exactly `pattern` fail.
    pub fn refuse(&self, pattern: impl Into<String>) {
        self.refuse.lock().unwrap().push(pattern.into());
    }

    /// Subscribed patterns, in subscription order.
    pub fn patterns(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.as_str().to_owned())
            .collect()
    }

    /// Publish a message; returns the number of subscriptions it was delivered to.
    pub fn publish(&self, topic: &str, payload: &[u8]) -> usize {
        // Deliver outside the lock so callbacks may publish again.
        let targets: Vec<Delivery> = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|(pattern, _)| pattern.matches(topic))
            .map(|(_, deliver)| deliver.clone())
            .collect();

        for deliver in &targets {
            deliver(Event::new(topic, payload));
        }
        targets.len()
    }
}

impl Subscriber for LocalBus {
    fn subscribe(&self, pattern: &str, deliver: Delivery) -> Result<(), TransportError> {
        if self.refuse.lock().unwrap().iter().any(|p| p == pattern) {
            return Err(TransportError::Subscribe {
                pattern: pattern.to_owned(),
                source: "subscription refused".into(),
            });
        }
        let compiled = Pattern::compile(pattern).map_err(|e| TransportError::Subscribe {
            pattern: pattern.to_owned(),
            source: Box::new(e),
        })?;
        self.subscriptions.lock().unwrap().push((compiled, deliver));
        Ok(())
    }
}
