//! Streaming HTTP reader
//!
//! Opens one GET request and hands the body out as chunks no larger than the
//! configured chunk size. The response, and with it the connection, is owned
//! by [`ChunkStream`] and released when the stream is dropped.

use crate::error::Result;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};

/// A finite, non-restartable sequence of body chunks
pub struct ChunkStream {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    pending: Bytes,
    chunk_size: usize,
    url: String,
}

impl ChunkStream {
    /// Issue the GET request and wrap the response body
    ///
    /// Fails with [`Error::Connection`](crate::error::Error::Connection) when
    /// the request cannot be sent or the server answers with a non-success
    /// status.
    pub async fn open(client: &reqwest::Client, url: &str, chunk_size: usize) -> Result<Self> {
        let response = client.get(url).send().await?.error_for_status()?;

        tracing::info!(
            url = %url,
            status = %response.status(),
            content_length = ?response.content_length(),
            "stream opened"
        );

        Ok(Self {
            body: response.bytes_stream().boxed(),
            pending: Bytes::new(),
            chunk_size: chunk_size.max(1),
            url: url.to_string(),
        })
    }

    /// Next chunk of at most `chunk_size` bytes, or `None` at end of stream
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        while self.pending.is_empty() {
            match self.body.next().await {
                Some(Ok(bytes)) => self.pending = bytes,
                Some(Err(e)) => return Err(e.into()),
                None => {
                    tracing::debug!(url = %self.url, "stream ended");
                    return Ok(None);
                }
            }
        }

        let take = self.chunk_size.min(self.pending.len());
        Ok(Some(self.pending.split_to(take)))
    }

    /// URL this stream was opened from
    pub fn url(&self) -> &str {
        &self.url
    }
}
