//! # Transport collaborators
//!
//! The relay consumes two narrow interfaces and implements neither:
//!
//! - [`Subscriber`]: the inbound MQTT side. Subscribes a raw pattern and
//!   delivers every matching publication to a callback.
//! - [`OscSender`]: the outbound OSC side. Sends one addressed message.
//!
//! Connection lifecycle (connect, authenticate, reconnect) belongs to the
//! implementations.

use crate::{
    error::TransportError,
    message::{Event, OscMessage},
};
use std::sync::Arc;

/// Callback invoked by a [`Subscriber`] for every delivered publication.
///
/// May be called concurrently from several threads.
pub type Delivery = Arc<dyn Fn(Event<'_>) + Send + Sync>;

/// Inbound pub/sub transport.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot subscribe to MQTT topics",
    label = "missing `Subscriber` implementation",
    note = "Implement `Subscriber::subscribe` for the transport client."
)]
pub trait Subscriber: Send + Sync {
    /// Subscribe `pattern` verbatim and route matching publications to `deliver`.
    fn subscribe(&self, pattern: &str, deliver: Delivery) -> Result<(), TransportError>;
}

/// Outbound OSC client.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot send OSC messages",
    label = "missing `OscSender` implementation",
    note = "Implement `OscSender::send` for the OSC client."
)]
pub trait OscSender: Send + Sync {
    /// Send one message.
    fn send(&self, message: &OscMessage) -> Result<(), TransportError>;
}

impl<T: Subscriber + ?Sized> Subscriber for Arc<T> {
    fn subscribe(&self, pattern: &str, deliver: Delivery) -> Result<(), TransportError> {
        (**self).subscribe(pattern, deliver)
    }
}

impl<T: OscSender + ?Sized> OscSender for Arc<T> {
    fn send(&self, message: &OscMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}
