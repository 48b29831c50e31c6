//! Subcommand implementations.
//!
//! Every command writes its report to `out` and returns an error when the
//! process should exit with a failure status.

use std::{io::Write, path::Path, sync::Mutex};

use anyhow::{Context, Result, bail};
use mqosc::{Event, InitPolicy, OscMessage, OscSender, Relay, RelayConfig, TransportError};

/// Write the sample configuration to `path`.
pub fn write_sample(path: &Path, force: bool, out: &mut dyn Write) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, pass --force to overwrite", path.display());
    }
    RelayConfig::sample()
        .write_to(path)
        .with_context(|| format!("failed to write sample config to {}", path.display()))?;
    writeln!(out, "wrote sample configuration to {}", path.display())?;
    Ok(())
}

fn load(path: &Path) -> Result<RelayConfig> {
    RelayConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Initialize every handler, reporting each one that fails.
pub fn check(path: &Path, out: &mut dyn Write) -> Result<()> {
    let relay = Relay::builder(load(path)?)
        .init_policy(InitPolicy::Skip)
        .build()
        .context("failed to initialize handlers")?;

    let registry = relay.registry();
    for handler in registry.handlers() {
        writeln!(out, "ok      {} -> {}", handler.pattern(), handler.template().as_str())?;
    }
    for skipped in registry.skipped() {
        writeln!(out, "FAILED  {}: {}", skipped.pattern, skipped.error)?;
    }

    if !registry.skipped().is_empty() {
        bail!(
            "{} of {} handler(s) failed to initialize",
            registry.skipped().len(),
            registry.len() + registry.skipped().len()
        );
    }
    Ok(())
}

/// Dry-run one message through the configuration.
pub fn render(path: &Path, topic: &str, payload: &str, out: &mut dyn Write) -> Result<()> {
    let relay = Relay::builder(load(path)?)
        .build()
        .context("failed to initialize handlers")?;

    let outbox = Outbox::default();
    let report = relay.dispatch(Event::new(topic, payload.as_bytes()), &outbox);

    for message in outbox.into_messages() {
        match &message.payload {
            Some(payload) => writeln!(
                out,
                "{} {}",
                message.address,
                String::from_utf8_lossy(payload)
            )?,
            None => writeln!(out, "{}", message.address)?,
        }
    }
    if report.matched == 0 {
        writeln!(out, "no handler matches `{topic}`")?;
    }
    for (pattern, err) in &report.failures {
        writeln!(out, "{pattern}: {err}")?;
    }
    if !report.is_ok() {
        bail!("{} of {} handler(s) failed", report.failures.len(), report.matched);
    }
    Ok(())
}

/// Collects messages instead of sending them.
#[derive(Debug, Default)]
struct Outbox {
    messages: Mutex<Vec<OscMessage>>,
}

impl Outbox {
    fn into_messages(self) -> Vec<OscMessage> {
        self.messages
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl OscSender for Outbox {
    fn send(&self, message: &OscMessage) -> Result<(), TransportError> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
        Ok(())
    }
}
