use std::str::FromStr;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::capture::{CaptureLayer, CapturedEvents};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Service that installed the global subscriber. Held while installing.
static INSTALLED: Mutex<Option<String>> = Mutex::new(None);

/// How log events are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with target and level.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Another subscriber was installed outside this crate.
    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(String),

    #[error("unknown log format '{0}'")]
    UnknownFormat(String),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install text logging for `service_name`.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    init_with_format(service_name, LogFormat::Text)
}

/// Install logging for `service_name` in the given format.
///
/// Only the first successful call installs a subscriber; later calls return
/// `Ok(())` and leave it in place.
pub fn init_with_format(service_name: &str, format: LogFormat) -> Result<(), TelemetryError> {
    install(service_name, || {
        let registry = tracing_subscriber::registry().with(env_filter());
        match format {
            LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_current_span(true).with_span_list(false))
                .try_init(),
        }
        .map_err(|e| e.to_string())
    })
}

/// Install text logging plus a [`CaptureLayer`] writing into `storage`.
pub fn init_with_capture(
    service_name: &str,
    storage: Arc<CapturedEvents>,
) -> Result<(), TelemetryError> {
    install(service_name, || {
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_target(true))
            .with(CaptureLayer::new(storage))
            .try_init()
            .map_err(|e| e.to_string())
    })
}

fn install(
    service_name: &str,
    try_init: impl FnOnce() -> Result<(), String>,
) -> Result<(), TelemetryError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if installed.is_some() {
        return Ok(());
    }
    try_init().map_err(TelemetryError::AlreadyInstalled)?;
    *installed = Some(service_name.to_string());
    drop(installed);
    tracing::debug!(service.name = %service_name, "telemetry initialised");
    Ok(())
}

/// Name of the service that installed the subscriber, if any.
pub fn installed_service() -> Option<String> {
    INSTALLED.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}
