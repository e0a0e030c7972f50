//! Error types for stream-monitor
//!
//! Two failure families matter at runtime:
//! - connection failures while opening or reading the HTTP stream, which end
//!   the measurement but still let the sinks drain normally
//! - sink failures: a file open/write failure stops only the file sink, a
//!   console write failure ends the run

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stream-monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stream-monitor
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "chunk_size")
        key: Option<String>,
    },

    /// The stream could not be opened, returned a non-success status, or
    /// failed mid-transfer
    #[error("{0}")]
    Connection(#[from] reqwest::Error),

    /// A sink failed to open or write its output
    #[error("{sink} sink failed: {source}")]
    Sink {
        /// Name of the failing sink ("console" or "file")
        sink: &'static str,
        /// Underlying failure
        #[source]
        source: SinkError,
    },

    /// A sink worker panicked or was cancelled before reporting
    #[error("sink worker {sink} did not complete: {reason}")]
    WorkerJoin {
        /// Name of the sink whose worker was lost
        sink: &'static str,
        /// Join failure description
        reason: String,
    },
}

/// Sink-level failures
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output file could not be opened for appending
    #[error("cannot open {path}: {source}")]
    Open {
        /// Path of the file that failed to open
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A row or line could not be written or flushed
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// CSV encoding or writer failure
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Build a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Build a sink error for the named sink
    pub fn sink(sink: &'static str, source: impl Into<SinkError>) -> Self {
        Error::Sink {
            sink,
            source: source.into(),
        }
    }
}
