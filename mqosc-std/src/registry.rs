//! Dispatch registry for handlers.
//!
//! The registry owns every [`Handler`], drives their initialization and
//! subscribes each pattern with the inbound transport. Routing itself is left
//! to the transport: each subscription delivers to exactly one handler.
//!
//! Activation happens once and is all or nothing. Deliveries are gated until
//! every subscription has succeeded; if one fails, the gate stays closed and
//! the subscriptions made so far never reach a handler.
//! [`Registry::dispatch`] is available for transports without native
//! wildcard routing and for dry runs.

use crate::handler::{Handler, HandlerBuilder};
use mqosc_core::{
    ConfigError, DynLogger, Event, EventError, Level, OscSender, Subscriber, TransportError,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

const IDLE: u8 = 0;
const ACTIVATING: u8 = 1;
const ACTIVE: u8 = 2;

/// What to do when a handler fails to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPolicy {
    /// Stop building and return the first error.
    #[default]
    Abort,
    /// Log a warning, leave the handler out and continue.
    Skip,
}

/// A handler left out under [`InitPolicy::Skip`].
#[derive(Debug)]
pub struct SkippedHandler {
    /// The configured pattern.
    pub pattern: String,
    /// Why initialization failed.
    pub error: ConfigError,
}

/// Outcome of routing one event through [`Registry::dispatch`].
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Handlers whose pattern matched the topic.
    pub matched: usize,
    /// Messages handed to the sender successfully.
    pub sent: usize,
    /// Failures, keyed by handler pattern.
    pub failures: Vec<(String, EventError)>,
}

impl DispatchReport {
    /// Whether every matching handler sent its message.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A registry of initialized handlers.
pub struct Registry {
    handlers: Vec<Arc<Handler>>,
    skipped: Vec<SkippedHandler>,
    state: AtomicU8,
    logger: DynLogger,
}

impl Registry {
    /// Start collecting handlers.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Initialized handlers, in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &Handler> {
        self.handlers.iter().map(Arc::as_ref)
    }

    /// Number of initialized handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler was initialized.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers left out during build.
    pub fn skipped(&self) -> &[SkippedHandler] {
        &self.skipped
    }

    /// Whether every handler has been subscribed.
    pub fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    /// Subscribe every handler's pattern, verbatim, with `subscriber`.
    ///
    /// Each delivery runs only the handler that owns the subscription and
    /// sends through `sender`. Stops at the first subscription failure and
    /// leaves the registry inactive; the subscriptions already made stay
    /// inert, so activation may be retried. Returns
    /// [`TransportError::AlreadySubscribed`] once the registry is active.
    pub fn activate(
        &self,
        subscriber: &dyn Subscriber,
        sender: Arc<dyn OscSender>,
    ) -> Result<(), TransportError> {
        if self
            .state
            .compare_exchange(IDLE, ACTIVATING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TransportError::AlreadySubscribed);
        }

        let open = Arc::new(AtomicBool::new(false));
        for handler in &self.handlers {
            let pattern = handler.pattern().as_str();
            let target = handler.clone();
            let sender = sender.clone();
            let gate = open.clone();
            let subscribed = subscriber.subscribe(
                pattern,
                Arc::new(move |event: Event<'_>| {
                    if gate.load(Ordering::Acquire) {
                        // Already logged by the handler.
                        let _ = target.on_event(event, &*sender);
                    }
                }),
            );
            if let Err(err) = subscribed {
                self.logger.log(
                    Level::Error,
                    format_args!("couldn't subscribe to `{pattern}`: {err}"),
                );
                self.state.store(IDLE, Ordering::Release);
                return Err(err);
            }
            self.logger
                .log(Level::Info, format_args!("subscribed to `{pattern}`"));
        }

        open.store(true, Ordering::Release);
        self.state.store(ACTIVE, Ordering::Release);
        Ok(())
    }

    /// Route one event to every handler whose pattern matches its topic.
    pub fn dispatch(&self, event: Event<'_>, sender: &dyn OscSender) -> DispatchReport {
        let mut report = DispatchReport::default();
        for handler in self.handlers.iter().filter(|h| h.pattern().matches(event.topic)) {
            report.matched += 1;
            match handler.on_event(event, sender) {
                Ok(()) => report.sent += 1,
                Err(err) => report
                    .failures
                    .push((handler.pattern().as_str().to_owned(), err)),
            }
        }
        if report.matched == 0 {
            self.logger.log(
                Level::Trace,
                format_args!("no handler for topic `{}`", event.topic),
            );
        }
        report
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.handlers)
            .field("skipped", &self.skipped)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Builder for constructing a Registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    handlers: Vec<HandlerBuilder>,
    policy: InitPolicy,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn register(mut self, handler: HandlerBuilder) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Choose what happens when a handler fails to initialize.
    pub fn policy(mut self, policy: InitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Initialize every handler and build the registry.
    pub fn build(self, logger: DynLogger) -> Result<Registry, ConfigError> {
        let mut handlers = Vec::with_capacity(self.handlers.len());
        let mut skipped = Vec::new();

        for builder in self.handlers {
            let pattern = builder.config().pattern.clone();
            match builder.init(logger.clone()) {
                Ok(handler) => handlers.push(Arc::new(handler)),
                Err(error) => match self.policy {
                    InitPolicy::Abort => {
                        logger.log(
                            Level::Error,
                            format_args!("couldn't initialize `{pattern}`: {error}"),
                        );
                        return Err(error);
                    }
                    InitPolicy::Skip => {
                        logger.log(
                            Level::Warn,
                            format_args!("skipping handler `{pattern}`: {error}"),
                        );
                        skipped.push(SkippedHandler { pattern, error });
                    }
                },
            }
        }

        Ok(Registry {
            handlers,
            skipped,
            state: AtomicU8::new(IDLE),
            logger,
        })
    }
}
