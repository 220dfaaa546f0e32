//! Tracing setup driven by the instance configuration

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::settings::InstanceSettings;
use crate::store::ConfigStore;
use crate::{ConfigError, Result};

/// Map a `log_level` value to a tracing level
pub fn level_directive(level: &str) -> &'static str {
    match level {
        "debug" => "debug",
        "info" => "info",
        "error" | "critical" => "error",
        _ => "warn",
    }
}

pub fn env_filter(store: &ConfigStore, settings: &InstanceSettings) -> Result<EnvFilter> {
    let directive = match &settings.log_filter {
        Some(filter) => filter.clone(),
        None => level_directive(&store.get_str("log_level")?).to_string(),
    };
    EnvFilter::try_new(&directive).map_err(|err| ConfigError::Logging(err.to_string()))
}

/// Install the global subscriber
///
/// Logs go to the `log_file` key (resolved against the instance folder) or
/// to stderr when it is empty.
pub fn init_tracing(store: &ConfigStore, settings: &InstanceSettings) -> Result<()> {
    let filter = env_filter(store, settings)?;
    let log_file = store.get_str("log_file")?;

    let (writer, ansi) = if log_file.is_empty() {
        (BoxMakeWriter::new(std::io::stderr), true)
    } else {
        let path = settings.resolve(&log_file);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ConfigError::Write { path, source })?;
        (BoxMakeWriter::new(Mutex::new(file)), false)
    };

    let fmt_layer = if settings.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| ConfigError::Logging(err.to_string()))
}
