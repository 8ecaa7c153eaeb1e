//! # vrag-telemetry
//!
//! Logging setup shared by the vrag binaries.
//!
//! Every vrag component logs through [`tracing`] with structured fields. This
//! crate installs the global subscriber that renders those events, either as
//! human-readable text or as one JSON object per line.
//!
//! ```no_run
//! use vrag_telemetry::{LogFormat, init_with_format};
//!
//! init_with_format("vrag", LogFormat::Json).ok();
//! tracing::info!(chunk_count = 42, "index built");
//! ```
//!
//! Filtering follows `RUST_LOG` and defaults to `info`.

pub mod capture;
pub mod init;

pub use capture::{CaptureLayer, CapturedEvent, CapturedEvents};
pub use init::{
    DEFAULT_FILTER, LogFormat, TelemetryError, init_telemetry, init_with_capture,
    init_with_format, installed_service,
};
