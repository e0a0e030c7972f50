//! Sample sinks and the workers that drive them
//!
//! Every enabled sink runs on its own blocking worker fed by an unbounded
//! FIFO channel, so a slow console or disk never holds up the network loop.
//! The producer ends a worker by sending [`SinkMessage::Shutdown`]; the worker
//! flushes, moves to [`SinkState::Closed`] and hands back a [`SinkReport`].
//!
//! A sink that fails stops writing but keeps consuming its channel until the
//! shutdown message arrives, counting what it drops. With
//! [`OnFailure::Abort`] the worker also names itself on an abort channel so
//! the producer can end the run; with [`OnFailure::Degrade`] the other sinks
//! and the producer carry on.

pub mod console;
pub mod file;

pub use console::ConsoleSink;
pub use file::FileSink;

use crate::error::{Error, SinkError};
use crate::types::{Sample, SinkMessage, SinkReport, SinkState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Destination for samples
///
/// Implementations do blocking I/O; they are only ever called from a
/// dedicated worker thread.
pub trait Sink: Send + 'static {
    /// Render or persist one sample
    fn publish(&mut self, sample: &Sample) -> Result<(), SinkError>;

    /// Flush anything buffered before the sink closes
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// What a worker does beyond disabling its sink when the sink fails
#[derive(Clone, Debug)]
pub enum OnFailure {
    /// Keep the run going without this sink
    Degrade,
    /// Send the sink name to the producer so it stops reading
    Abort(mpsc::UnboundedSender<&'static str>),
}

impl OnFailure {
    fn notify(&self, sink: &'static str) {
        if let OnFailure::Abort(aborts) = self
            && aborts.send(sink).is_err()
        {
            tracing::trace!(sink, "abort sent after producer stopped");
        }
    }
}

/// Handle to a running sink worker
pub struct SinkWorker {
    name: &'static str,
    tx: mpsc::UnboundedSender<SinkMessage>,
    handle: JoinHandle<SinkReport>,
}

impl SinkWorker {
    /// Spawn a worker that opens its sink with `open` and then consumes samples
    ///
    /// Opening happens on the worker thread. If it fails the worker reports
    /// the error, applies `on_failure` and discards samples until shutdown.
    pub fn spawn<S, F>(name: &'static str, on_failure: OnFailure, open: F) -> Self
    where
        S: Sink,
        F: FnOnce() -> Result<S, SinkError> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || run_worker(name, on_failure, open, rx));
        Self { name, tx, handle }
    }

    /// Queue a sample for the sink
    ///
    /// A worker that has already closed ignores the sample.
    pub fn send(&self, sample: Sample) {
        if self.tx.send(SinkMessage::Sample(sample)).is_err() {
            tracing::trace!(sink = self.name, "sample sent to closed sink ignored");
        }
    }

    /// Signal end-of-stream
    ///
    /// Safe to call more than once; repeats after the worker closed are no-ops.
    pub fn shutdown(&self) {
        if self.tx.send(SinkMessage::Shutdown).is_err() {
            tracing::trace!(sink = self.name, "shutdown sent to closed sink ignored");
        }
    }

    /// Sink name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal shutdown and wait for the worker to drain
    pub async fn join(self) -> SinkReport {
        self.shutdown();
        let name = self.name;
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(sink = name, error = %e, "sink worker did not complete");
                SinkReport {
                    sink: name,
                    published: 0,
                    dropped: 0,
                    final_state: SinkState::Closed,
                    error: Some(Error::WorkerJoin {
                        sink: name,
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }
}

fn run_worker<S, F>(
    name: &'static str,
    on_failure: OnFailure,
    open: F,
    mut rx: mpsc::UnboundedReceiver<SinkMessage>,
) -> SinkReport
where
    S: Sink,
    F: FnOnce() -> Result<S, SinkError>,
{
    let mut state = SinkState::Idle;
    let mut published = 0u64;
    let mut dropped = 0u64;
    let mut error = None;

    let mut sink = match open() {
        Ok(sink) => {
            state = state.start();
            tracing::debug!(sink = name, "sink running");
            Some(sink)
        }
        Err(e) => {
            tracing::error!(sink = name, error = %e, "sink failed to open");
            error = Some(Error::sink(name, e));
            on_failure.notify(name);
            None
        }
    };

    // A closed channel (producer gone) ends the loop like an explicit shutdown
    while let Some(message) = rx.blocking_recv() {
        match message {
            SinkMessage::Sample(sample) => {
                let outcome = match sink.as_mut() {
                    Some(active) if state.accepts_writes() => Some(active.publish(&sample)),
                    _ => None,
                };
                match outcome {
                    Some(Ok(())) => published += 1,
                    Some(Err(e)) => {
                        tracing::error!(sink = name, error = %e, "sink write failed, disabling sink");
                        error = Some(Error::sink(name, e));
                        on_failure.notify(name);
                        sink = None;
                        dropped += 1;
                    }
                    None => dropped += 1,
                }
            }
            SinkMessage::Shutdown => break,
        }
    }

    state = state.drain();
    if let Some(mut active) = sink.take()
        && let Err(e) = active.finish()
    {
        tracing::error!(sink = name, error = %e, "sink flush failed");
        error.get_or_insert(Error::sink(name, e));
    }
    state = state.close();
    rx.close();

    tracing::debug!(sink = name, published, dropped, "sink closed");

    SinkReport {
        sink: name,
        published,
        dropped,
        final_state: state,
        error,
    }
}
