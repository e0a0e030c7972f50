//! Command line surface

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Monitor a stream and write measurements to a CSV file.
#[derive(Parser, Debug, Clone)]
#[command(name = "stream-monitor", version, about)]
pub struct Cli {
    /// The URL of the stream to monitor.
    pub url: String,

    /// The interval in seconds between measurements.
    #[arg(short = 'i', long = "interval", default_value_t = 1)]
    pub interval: u64,

    /// The size of the chunks to read from the stream.
    #[arg(short = 'c', long = "chunk_size", default_value_t = 8192)]
    pub chunk_size: usize,

    /// Report the raw byte count instead of the kilobit conversion.
    #[arg(short = 'k', long = "convert_to_kbps")]
    pub convert_to_kbps: bool,

    /// Do not print the measurements to the console.
    #[arg(short = 's', long = "silent")]
    pub silent: bool,

    /// Write the measurements to a CSV file.
    #[arg(short = 'v', long = "csv")]
    pub csv: bool,

    /// The name of the CSV file to write to.
    #[arg(short = 'f', long = "filename", default_value = "stream_monitor.csv")]
    pub filename: PathBuf,

    /// Enable debug logging on stderr.
    #[arg(long = "verbose")]
    pub verbose: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            url: cli.url,
            interval_secs: cli.interval,
            chunk_size: cli.chunk_size,
            convert_to_kbps: cli.convert_to_kbps,
            silent: cli.silent,
            csv: cli.csv,
            filename: cli.filename,
        }
    }
}
