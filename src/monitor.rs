//! Producer loop: read the stream, close windows, fan samples out to sinks
//!
//! [`Monitor`] owns the whole run. It spawns one worker per enabled sink,
//! reads chunks until the stream ends, fails or a shutdown future resolves,
//! then signals every worker and waits for all of them before returning a
//! [`RunSummary`]. Connection failures end the stream but are reported in the
//! summary rather than returned as errors.
//!
//! A console write failure is fatal to the run: the console worker signals
//! the producer, which stops reading and drains the remaining sinks. The file
//! sink degrades instead, leaving the stream and the console running.

use crate::config::Config;
use crate::error::Result;
use crate::reader::ChunkStream;
use crate::sampler::RateSampler;
use crate::sink::{ConsoleSink, FileSink, OnFailure, SinkWorker, console, file};
use crate::types::RunSummary;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::time::Instant;
use tokio::sync::mpsc;

/// One monitoring session
pub struct Monitor {
    config: Config,
    client: reqwest::Client,
    console_writer: Option<Box<dyn Write + Send>>,
}

impl Monitor {
    /// Validate `config` and prepare the HTTP client
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("stream-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            client,
            console_writer: None,
        })
    }

    /// Send console lines to `writer` instead of standard output
    pub fn with_console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console_writer = Some(Box::new(writer));
        self
    }

    /// Run until the stream ends or fails
    pub async fn run(self) -> RunSummary {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until the stream ends, fails, or `shutdown` resolves
    ///
    /// Every sink is drained and joined before this returns, whichever way
    /// the stream stopped.
    pub async fn run_until<F>(mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let (aborts_tx, mut aborts) = mpsc::unbounded_channel();
        let sinks = self.spawn_sinks(aborts_tx);
        let mut summary = RunSummary::default();

        tracing::info!(
            url = %self.config.url,
            interval_secs = self.config.interval_secs,
            chunk_size = self.config.chunk_size,
            unit = ?self.config.rate_unit(),
            sinks = ?sinks.iter().map(SinkWorker::name).collect::<Vec<_>>(),
            "monitoring stream"
        );

        let shutdown = std::pin::pin!(shutdown);
        if let Err(e) = self
            .stream(&sinks, &mut summary, &mut aborts, shutdown)
            .await
        {
            tracing::warn!(url = %self.config.url, error = %e, "stream ended with connection error");
            summary.connection_error = Some(e.to_string());
        }

        for sink in &sinks {
            sink.shutdown();
        }
        for sink in sinks {
            summary.sinks.push(sink.join().await);
        }

        tracing::info!(
            samples = summary.samples_emitted,
            bytes = summary.bytes_received,
            discarded_bytes = summary.discarded_bytes,
            sink_failures = summary.has_sink_failures(),
            stopped_by = ?summary.stopped_by,
            "monitoring finished"
        );
        summary
    }

    fn spawn_sinks(&mut self, aborts: mpsc::UnboundedSender<&'static str>) -> Vec<SinkWorker> {
        let mut sinks = Vec::with_capacity(2);

        if self.config.console_enabled() {
            let interval_secs = self.config.interval_secs;
            let on_failure = OnFailure::Abort(aborts);
            let worker = match self.console_writer.take() {
                Some(writer) => SinkWorker::spawn(console::NAME, on_failure, move || {
                    Ok(ConsoleSink::new(writer, interval_secs))
                }),
                None => SinkWorker::spawn(console::NAME, on_failure, move || {
                    Ok(ConsoleSink::stdout(interval_secs))
                }),
            };
            sinks.push(worker);
        }

        if self.config.file_enabled() {
            let path = self.config.filename.clone();
            sinks.push(SinkWorker::spawn(file::NAME, OnFailure::Degrade, move || {
                FileSink::open(path)
            }));
        }

        sinks
    }

    async fn stream<F>(
        &self,
        sinks: &[SinkWorker],
        summary: &mut RunSummary,
        aborts: &mut mpsc::UnboundedReceiver<&'static str>,
        mut shutdown: Pin<&mut F>,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut stream =
            ChunkStream::open(&self.client, &self.config.url, self.config.chunk_size).await?;
        let mut sampler = RateSampler::new(
            self.config.interval(),
            self.config.rate_unit(),
            Instant::now(),
        );

        let outcome = loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping stream");
                    Ok(None)
                }
                Some(sink) = aborts.recv() => {
                    tracing::warn!(sink, "sink failed, stopping stream");
                    summary.stopped_by = Some(sink);
                    Ok(None)
                }
                next = stream.next_chunk() => next,
            };

            let chunk = match next {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            summary.bytes_received += chunk.len() as u64;
            if let Some(sample) = sampler.record(chunk.len(), Instant::now()) {
                summary.samples_emitted += 1;
                tracing::debug!(rate = sample.rate, bytes = sample.bytes, "window closed");
                for sink in sinks {
                    sink.send(sample.clone());
                }
            }
        };

        summary.discarded_bytes = sampler.pending_bytes();
        outcome
    }
}
