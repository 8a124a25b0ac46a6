//! Structured telemetry initialisation for the CLI.

use std::io::{self, IsTerminal};

use clap::ValueEnum;
use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Log output formats supported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-oriented single-line output.
    Compact,
    /// Newline-delimited JSON for log collectors.
    Json,
}

/// Configures the global tracing subscriber when invoked for the first
/// time. Repeated calls are idempotent.
pub fn initialise(filter: &str, format: LogFormat) {
    TELEMETRY_GUARD.get_or_init(|| install_subscriber(filter, format));
}

fn install_subscriber(filter: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    // A failure here means another subscriber is already installed, which
    // is fine for an embedding process.
    drop(tracing::subscriber::set_global_default(subscriber));
}
