//! Core types shared between the sampler, the sinks and the monitor

use chrono::{DateTime, Local, SecondsFormat};

/// One throughput measurement, produced when a window closes
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Wall-clock time at which the window closed
    pub timestamp: DateTime<Local>,
    /// Rate for the window, in the configured [`RateUnit`](crate::config::RateUnit)
    pub rate: f64,
    /// Raw bytes accumulated in the window
    pub bytes: u64,
}

impl Sample {
    /// ISO-8601 rendering of the timestamp with microsecond precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

/// Message carried on a sink channel
#[derive(Clone, Debug, PartialEq)]
pub enum SinkMessage {
    /// A sample to render or persist
    Sample(Sample),
    /// No more samples will follow
    Shutdown,
}

/// Lifecycle of a sink worker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    /// Spawned, output not opened yet
    Idle,
    /// Output open, accepting samples
    Running,
    /// End-of-stream received, flushing what is queued
    Draining,
    /// Terminal; no further writes happen
    Closed,
}

impl SinkState {
    /// Apply a start signal
    pub fn start(self) -> Self {
        match self {
            SinkState::Idle => SinkState::Running,
            other => other,
        }
    }

    /// Apply an end-of-stream signal
    pub fn drain(self) -> Self {
        match self {
            SinkState::Idle | SinkState::Running => SinkState::Draining,
            other => other,
        }
    }

    /// Mark the queue as flushed
    pub fn close(self) -> Self {
        SinkState::Closed
    }

    /// Whether writes are still permitted
    pub fn accepts_writes(self) -> bool {
        matches!(self, SinkState::Running | SinkState::Draining)
    }
}

/// Outcome of one sink worker, returned when it is joined
#[derive(Debug)]
pub struct SinkReport {
    /// Sink name ("console" or "file")
    pub sink: &'static str,
    /// Samples written successfully
    pub published: u64,
    /// Samples received after the sink failed and dropped
    pub dropped: u64,
    /// State the worker ended in
    pub final_state: SinkState,
    /// Failure that stopped the sink, if any
    pub error: Option<crate::error::Error>,
}

/// Totals for a complete monitoring run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Samples produced by the sampler
    pub samples_emitted: u64,
    /// Bytes read from the stream
    pub bytes_received: u64,
    /// Bytes in the final, incomplete window that were not reported
    pub discarded_bytes: u64,
    /// Connection failure that ended the stream, rendered for display
    pub connection_error: Option<String>,
    /// Sink whose failure stopped the stream early
    pub stopped_by: Option<&'static str>,
    /// Reports from every sink that ran
    pub sinks: Vec<SinkReport>,
}

impl RunSummary {
    /// Whether any sink stopped because of an error
    pub fn has_sink_failures(&self) -> bool {
        self.sinks.iter().any(|report| report.error.is_some())
    }

    /// Report for the named sink, if it ran
    pub fn sink(&self, name: &str) -> Option<&SinkReport> {
        self.sinks.iter().find(|report| report.sink == name)
    }
}
