//! Messages crossing the relay boundary.

/// One inbound MQTT publication as delivered by the transport.
///
/// Borrowed so the transport can hand out its own buffers without copying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event<'a> {
    /// The concrete topic the message was published on.
    pub topic: &'a str,
    /// The raw message payload.
    pub payload: &'a [u8],
}

impl<'a> Event<'a> {
    /// Create an event from a topic and a raw payload.
    pub const fn new(topic: &'a str, payload: &'a [u8]) -> Self {
        Self { topic, payload }
    }

    /// The payload as text, replacing invalid UTF-8 sequences.
    pub fn payload_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.payload)
    }
}

/// An outgoing OSC command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscMessage {
    /// The rendered OSC address.
    pub address: String,
    /// The relayed MQTT payload, if the handler relays payloads.
    pub payload: Option<Vec<u8>>,
}

impl OscMessage {
    /// Create a message without arguments.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}
