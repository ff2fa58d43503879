//! Logging infrastructure.
//!
//! Two layers, with different audiences:
//! - `tracing` for developer diagnostics, initialized once per process
//!   via [`init_tracing`];
//! - [`ExportLogger`] for the user-facing per-export log: file plus
//!   callback dual output, compact progress filtering, and a bounded
//!   tail buffer replayed on failure.

mod export_logger;
mod types;

pub use export_logger::ExportLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG` when set, otherwise uses `default_level`.
/// Call once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}
