//! Human-readable console output

use super::Sink;
use crate::error::SinkError;
use crate::types::Sample;
use std::io::Write;

/// Name used in logs and sink reports
pub const NAME: &str = "console";

/// Prints one line per sample
pub struct ConsoleSink<W: Write + Send + 'static> {
    writer: W,
    interval_secs: u64,
}

impl ConsoleSink<std::io::Stdout> {
    /// Console sink on standard output
    pub fn stdout(interval_secs: u64) -> Self {
        Self::new(std::io::stdout(), interval_secs)
    }
}

impl<W: Write + Send + 'static> ConsoleSink<W> {
    /// Console sink writing to `writer`
    pub fn new(writer: W, interval_secs: u64) -> Self {
        Self {
            writer,
            interval_secs,
        }
    }

    /// Display line for a sample
    ///
    /// The "kB/s" label is printed for both rate units.
    pub fn render(&self, sample: &Sample) -> String {
        format!(
            "Bytes received in last {} seconds: {:.2} kB/s",
            self.interval_secs, sample.rate
        )
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + 'static> Sink for ConsoleSink<W> {
    fn publish(&mut self, sample: &Sample) -> Result<(), SinkError> {
        let line = self.render(sample);
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
