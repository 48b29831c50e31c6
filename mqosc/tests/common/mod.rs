#![allow(dead_code)]

use mqosc::{
    AuxData, BoxError, HandlerConfig, Relay, RelayConfig, Translate,
    testing::{LocalBus, RecordingLogger, RecordingSender},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Fixtures
// ============================================================================

pub struct Fixture {
    pub relay: Relay,
    pub bus: LocalBus,
    pub sender: Arc<RecordingSender>,
    pub logger: RecordingLogger,
}

pub fn config(handlers: Vec<HandlerConfig>) -> RelayConfig {
    RelayConfig {
        handlers,
        ..RelayConfig::default()
    }
}

/// Build and start a relay on a fresh local bus.
pub fn started(relay: mqosc::RelayBuilder) -> Fixture {
    let logger = RecordingLogger::new();
    let relay = relay.logger(Arc::new(logger.clone())).build().unwrap();
    let bus = LocalBus::new();
    let sender = Arc::new(RecordingSender::new());
    relay.start(&bus, sender.clone()).unwrap();
    Fixture {
        relay,
        bus,
        sender,
        logger,
    }
}

// ============================================================================
// Test Hooks
// ============================================================================

/// Counts invocations and returns a fixed key set.
pub struct CountingTranslate {
    pub calls: Arc<AtomicUsize>,
    pub key: &'static str,
}

impl Translate for CountingTranslate {
    fn translate(&self, _topic: &str, payload: &str) -> Result<AuxData, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut data = AuxData::new();
        data.insert(self.key.to_owned(), payload.to_owned());
        Ok(data)
    }
}

/// Fails whenever the payload says so.
pub fn failing_on_boom(_topic: &str, payload: &str) -> Result<AuxData, BoxError> {
    if payload == "boom" {
        return Err("hook failed on purpose".into());
    }
    Ok(AuxData::new())
}
