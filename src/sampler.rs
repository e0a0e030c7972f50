//! Fixed-window byte rate sampler
//!
//! The sampler owns the window accumulator. Bytes are summed until the
//! window has been open for longer than the interval, at which point one
//! [`Sample`] is produced and a new window starts at the closing instant.
//!
//! A chunk whose arrival closes a window is counted in the *next* window, so
//! a sample only ever contains bytes that arrived before its boundary. With a
//! zero interval every chunk closes its own window and the sample carries
//! exactly that chunk.
//!
//! Bytes in a window that never closes (the stream ended first) are not
//! reported; [`RateSampler::pending_bytes`] exposes them for the run summary.

use crate::config::RateUnit;
use crate::types::Sample;
use chrono::{Local, SubsecRound};
use std::time::{Duration, Instant};

/// Rolling-sum sampler over fixed wall-clock windows
#[derive(Debug)]
pub struct RateSampler {
    interval: Duration,
    unit: RateUnit,
    bytes_accumulated: u64,
    window_start: Instant,
}

impl RateSampler {
    /// Create a sampler whose first window opens at `start`
    pub fn new(interval: Duration, unit: RateUnit, start: Instant) -> Self {
        Self {
            interval,
            unit,
            bytes_accumulated: 0,
            window_start: start,
        }
    }

    /// Add a received chunk to the open window
    pub fn on_chunk(&mut self, byte_count: usize) {
        self.bytes_accumulated = self.bytes_accumulated.saturating_add(byte_count as u64);
    }

    /// Close the window if it has been open longer than the interval
    ///
    /// Returns the sample for the closed window and opens a new one at `now`.
    pub fn maybe_emit(&mut self, now: Instant) -> Option<Sample> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if !self.interval.is_zero() && elapsed <= self.interval {
            return None;
        }

        let bytes = std::mem::take(&mut self.bytes_accumulated);
        self.window_start = now;

        Some(Sample {
            // Persisted rows carry microseconds; keep the sample exact
            timestamp: Local::now().trunc_subsecs(6),
            rate: self.unit.rate(bytes),
            bytes,
        })
    }

    /// Account for one chunk arriving at `now`
    ///
    /// Closes the previous window first when its interval has passed, so the
    /// chunk lands in the window it arrived in.
    pub fn record(&mut self, byte_count: usize, now: Instant) -> Option<Sample> {
        if self.interval.is_zero() {
            self.on_chunk(byte_count);
            return self.maybe_emit(now);
        }

        let sample = self.maybe_emit(now);
        self.on_chunk(byte_count);
        sample
    }

    /// Bytes in the window that is currently open
    pub fn pending_bytes(&self) -> u64 {
        self.bytes_accumulated
    }

    /// Configured window length
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
