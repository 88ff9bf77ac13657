//! # File-Chain Telemetry
//!
//! Logging bootstrap shared by File-Chain binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Application code; `tracing` records are now emitted
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_SERVICE_NAME` | `file-chain` | Service name in records |
//! | `FC_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter directive |
//! | `FC_CONSOLE_OUTPUT` | `true` | Write records to stdout |
//! | `FC_JSON_LOGS` | `false` | JSON instead of pretty output |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Configuration could not be applied
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the logging stack.
///
/// Returns a guard that should be held for the lifetime of the application.
/// Calling this a second time in one process yields
/// [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Logs a shutdown record on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    /// Service the guard was installed for
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
