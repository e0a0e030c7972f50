//! # stream-monitor
//!
//! Measures the throughput of a streamed HTTP download over fixed time
//! windows and reports one sample per window to the console and/or an
//! append-only CSV file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stream_monitor::{Config, Monitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         csv: true,
//!         ..Config::for_url("http://radio.example.com/live.mp3")
//!     };
//!
//!     let summary = Monitor::new(config)?.run().await;
//!     if let Some(error) = summary.connection_error {
//!         println!("Connection error: {error}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command line surface
pub mod cli;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Producer loop and run orchestration
pub mod monitor;
/// Streaming HTTP reader
pub mod reader;
/// Fixed-window rate sampler
pub mod sampler;
/// Console and CSV sinks
pub mod sink;
/// Core types
pub mod types;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{Config, RateUnit};
pub use error::{Error, Result, SinkError};
pub use monitor::Monitor;
pub use sampler::RateSampler;
pub use sink::OnFailure;
pub use types::{RunSummary, Sample, SinkReport, SinkState};

/// Run a monitor until the stream ends or a termination signal arrives.
///
/// A signal stops reading; the sinks are drained exactly as at end of stream.
///
/// # Example
///
/// ```no_run
/// use stream_monitor::{Config, Monitor, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let monitor = Monitor::new(Config::for_url("http://radio.example.com/live"))?;
///     let summary = run_with_shutdown(monitor).await;
///     println!("{} samples", summary.samples_emitted);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(monitor: Monitor) -> RunSummary {
    monitor.run_until(wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C, running until stream ends");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C, running until stream ends");
            std::future::pending::<()>().await;
        }
    }
}
