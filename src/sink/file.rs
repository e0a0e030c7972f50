//! Append-only CSV output
//!
//! Rows are `timestamp,rate` with no header. The file is opened once in
//! append mode and flushed after every row, so a killed process loses at
//! most the row being written.

use super::Sink;
use crate::error::SinkError;
use crate::types::Sample;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Name used in logs and sink reports
pub const NAME: &str = "file";

/// Appends one CSV row per sample
pub struct FileSink {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl FileSink {
    /// Open `path` for appending, creating it when missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Open {
                path: path.clone(),
                source,
            })?;

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        tracing::debug!(path = %path.display(), "csv sink opened");
        Ok(Self { writer, path })
    }

    /// Path rows are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn publish(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.writer
            .write_record([sample.timestamp_iso(), sample.rate.to_string()])?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
