//! Shared helpers for end-to-end monitor runs

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cloneable in-memory writer used to capture console sink output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Captured output as UTF-8 text
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writer whose every write fails, standing in for a closed stdout
pub struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "stdout closed",
        ))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// How a raw server ends the connection after sending its body
#[derive(Clone, Copy)]
pub enum AfterBody {
    /// Close the socket, cutting the declared body short
    Close,
    /// Keep the socket open without sending anything more
    Stall,
}

/// Serve one connection that declares `content_length` bytes but sends `body`
///
/// Returns the URL to request.
pub async fn serve_partial(content_length: usize, body: Vec<u8>, after: AfterBody) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        // Consume the whole request head so closing sends FIN, not RST
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {content_length}\r\n\r\n"
        );
        if socket.write_all(head.as_bytes()).await.is_err()
            || socket.write_all(&body).await.is_err()
        {
            return;
        }
        let _ = socket.flush().await;

        match after {
            AfterBody::Close => {
                let _ = socket.shutdown().await;
            }
            AfterBody::Stall => std::future::pending::<()>().await,
        }
    });

    format!("http://{addr}/stream")
}

/// Start a mock server that serves `body` at `route`
pub async fn serve_stream(route: &str, body: Vec<u8>) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&mock_server)
        .await;
    mock_server
}

/// Start a mock server that answers `route` with `status` and no body
pub async fn serve_status(route: &str, status: u16) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(&mock_server)
        .await;
    mock_server
}

/// Read `timestamp,rate` rows back from a CSV file written by the file sink
pub fn read_rows(path: &Path) -> Vec<(String, f64)> {
    let Ok(mut reader) = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
    else {
        return Vec::new();
    };

    reader
        .records()
        .filter_map(|record| record.ok())
        .filter_map(|record| {
            let rate = record.get(1)?.parse().ok()?;
            Some((record.get(0)?.to_string(), rate))
        })
        .collect()
}
