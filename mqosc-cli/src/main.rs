//! mqosc - MQTT to OSC relay
//!
//! Command line front end: writes sample configurations, validates handler
//! definitions and dry-runs topics through them.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// mqosc - MQTT to OSC relay
#[derive(Parser, Debug)]
#[command(name = "mqosc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Shorthand for `--log-level debug`
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample configuration file
    #[command(alias = "cfg")]
    Config {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Initialize every handler of a configuration and report failures
    Check {
        /// Configuration file
        path: PathBuf,
    },

    /// Route one MQTT message through the configured handlers and print the OSC output
    Render {
        /// Configuration file
        path: PathBuf,

        /// MQTT topic
        #[arg(short, long)]
        topic: String,

        /// MQTT payload
        #[arg(short, long, default_value = "")]
        payload: String,
    },
}

impl Cli {
    fn filter(&self) -> EnvFilter {
        let level = if self.debug { "debug" } else { &self.log_level };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(cli.filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Config { path, force } => commands::write_sample(&path, force, &mut out),
        Commands::Check { path } => commands::check(&path, &mut out),
        Commands::Render {
            path,
            topic,
            payload,
        } => commands::render(&path, &topic, &payload, &mut out),
    }
}
