//! Configuration types for stream-monitor

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Unit applied to the byte count of a closed window
///
/// The polarity is inherited from the `convert_to_kbps` flag: when the flag is
/// **set** the raw byte count is reported untouched, and when it is **unset**
/// bytes are converted to kilobits (`bytes * 8 / 1000`). Console output labels
/// both as "kB/s".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    /// `bytes * 8 / 1000` (flag unset, the default)
    #[default]
    Kilobits,
    /// Raw byte count (flag set)
    RawBytes,
}

impl RateUnit {
    /// Map the `convert_to_kbps` flag to its (inverted) unit
    pub fn from_convert_flag(convert_to_kbps: bool) -> Self {
        if convert_to_kbps {
            RateUnit::RawBytes
        } else {
            RateUnit::Kilobits
        }
    }

    /// Convert a window byte count to the reported rate
    pub fn rate(self, bytes: u64) -> f64 {
        match self {
            RateUnit::RawBytes => bytes as f64,
            RateUnit::Kilobits => bytes as f64 * 8.0 / 1000.0,
        }
    }
}

/// Session configuration for one monitoring run
///
/// Built once at startup (from the command line or deserialized) and
/// validated with [`Config::validate`] before any network activity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// HTTP(S) URL of the stream to monitor
    pub url: String,

    /// Sampling window length in whole seconds (default: 1, 0 = one sample per chunk)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum bytes per chunk handed to the sampler (default: 8192)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Report raw byte counts instead of converting to kilobits
    ///
    /// See [`RateUnit`] for the inverted meaning of this flag.
    #[serde(default)]
    pub convert_to_kbps: bool,

    /// Suppress the console sink
    #[serde(default)]
    pub silent: bool,

    /// Enable the CSV file sink
    #[serde(default)]
    pub csv: bool,

    /// CSV file sink target (default: "stream_monitor.csv")
    #[serde(default = "default_filename")]
    pub filename: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval_secs: default_interval_secs(),
            chunk_size: default_chunk_size(),
            convert_to_kbps: false,
            silent: false,
            csv: false,
            filename: default_filename(),
        }
    }
}

impl Config {
    /// Create a configuration for `url` with every other setting at its default
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Window length as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Unit derived from the `convert_to_kbps` flag
    pub fn rate_unit(&self) -> RateUnit {
        RateUnit::from_convert_flag(self.convert_to_kbps)
    }

    /// Whether samples are printed to the console
    pub fn console_enabled(&self) -> bool {
        !self.silent
    }

    /// Whether samples are appended to the CSV file
    pub fn file_enabled(&self) -> bool {
        self.csv
    }

    /// Check the configuration once before a run
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| Error::config("url", format!("invalid URL '{}': {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "url",
                format!("unsupported scheme '{}', expected http or https", parsed.scheme()),
            ));
        }

        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size", "chunk_size must be greater than zero"));
        }

        if self.csv && self.filename.as_os_str().is_empty() {
            return Err(Error::config(
                "filename",
                "filename must not be empty when csv output is enabled",
            ));
        }

        Ok(())
    }
}

fn default_interval_secs() -> u64 {
    1
}

fn default_chunk_size() -> usize {
    8192
}

fn default_filename() -> PathBuf {
    PathBuf::from("stream_monitor.csv")
}
