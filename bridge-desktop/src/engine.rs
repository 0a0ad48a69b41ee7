//! HTTP stream engine using reqwest
//!
//! One tokio task per opened stream:
//!
//! 1. emit `Buffering`, send the GET (with `Icy-MetaData: 1` when enabled)
//! 2. non-2xx status: emit `Error("HTTP <code>")`
//! 3. `icy-name` header: emit `MetadataChanged { station }`
//! 4. read the body, splitting ICY metadata blocks out every `icy-metaint` bytes
//! 5. once `prebuffer_bytes` of audio arrived: emit `Ready` and
//!    `PlayingChanged(true)`
//! 6. clean EOF: emit `Ended`; transport failure: emit `Error(message)`
//!
//! Releasing the handle cancels the task through a [`CancellationToken`].

use std::sync::Arc;

use bridge_traits::{
    error::{BridgeError, Result},
    EngineEvent, EngineEventSink, EngineHandle, StreamEngine, StreamMetadata,
};
use futures_util::StreamExt;
use reqwest::{Client, Response, Url};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::HttpEngineConfig;
use crate::icy::{self, IcyChunk, IcyDemuxer};
use crate::output::{AudioOutput, DiscardOutput};

#[derive(Debug, Error)]
enum StreamError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Reqwest-based [`StreamEngine`].
pub struct HttpStreamEngine {
    client: Client,
    config: HttpEngineConfig,
    output: Arc<dyn AudioOutput>,
}

impl HttpStreamEngine {
    /// Engine with a [`DiscardOutput`].
    pub fn new(config: HttpEngineConfig) -> Result<Self> {
        Self::with_output(config, Arc::new(DiscardOutput::new()))
    }

    pub fn with_output(config: HttpEngineConfig, output: Arc<dyn AudioOutput>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            output,
        })
    }

    pub fn config(&self) -> &HttpEngineConfig {
        &self.config
    }
}

impl StreamEngine for HttpStreamEngine {
    fn open(&self, url: &str, sink: Arc<dyn EngineEventSink>) -> Result<Box<dyn EngineHandle>> {
        let url = Url::parse(url).map_err(|e| BridgeError::InvalidUri(format!("{}: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BridgeError::InvalidUri(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let runtime = Handle::try_current().map_err(|_| {
            BridgeError::NotAvailable("HTTP stream engine requires a tokio runtime".to_string())
        })?;

        let cancel = CancellationToken::new();
        let task = StreamTask {
            client: self.client.clone(),
            url,
            config: self.config.clone(),
            output: self.output.clone(),
            sink,
        };

        let token = cancel.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("stream task cancelled"),
                _ = task.run() => {}
            }
        });

        Ok(Box::new(HttpStreamHandle { cancel }))
    }
}

/// Handle for one HTTP stream. Dropping it releases the stream too.
pub struct HttpStreamHandle {
    cancel: CancellationToken,
}

impl EngineHandle for HttpStreamHandle {
    fn release(&mut self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
        }
    }
}

impl Drop for HttpStreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct StreamTask {
    client: Client,
    url: Url,
    config: HttpEngineConfig,
    output: Arc<dyn AudioOutput>,
    sink: Arc<dyn EngineEventSink>,
}

impl StreamTask {
    async fn run(self) {
        self.sink.emit(EngineEvent::Buffering);

        match self.stream().await {
            Ok(received) => {
                info!(received, "stream ended");
                self.sink.emit(EngineEvent::Ended);
            }
            Err(err) => {
                warn!(error = %err, "stream failed");
                self.sink.emit(EngineEvent::Error(err.to_string()));
            }
        }
    }

    /// Returns the number of audio bytes received.
    async fn stream(&self) -> std::result::Result<usize, StreamError> {
        let mut request = self.client.get(self.url.clone());
        if self.config.request_icy_metadata {
            request = request.header("Icy-MetaData", "1");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status.as_u16()));
        }

        if let Some(station) = header(&response, "icy-name") {
            self.sink
                .emit(EngineEvent::MetadataChanged(StreamMetadata::station(station)));
        }

        let metaint = header(&response, "icy-metaint")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&n| n > 0);
        debug!(?metaint, "stream connected");

        let mut demuxer = metaint.map(IcyDemuxer::new);
        let mut received = 0usize;
        let mut playing = false;

        self.output.reset();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let parts = match demuxer.as_mut() {
                Some(demuxer) => demuxer.push(chunk),
                None => vec![IcyChunk::Audio(chunk)],
            };

            for part in parts {
                match part {
                    IcyChunk::Audio(bytes) => {
                        received += bytes.len();
                        self.output.write(&bytes);
                        if !playing && received >= self.config.prebuffer_bytes {
                            playing = true;
                            self.start_playing();
                        }
                    }
                    IcyChunk::Metadata(block) => self.on_metadata(&block),
                }
            }
        }

        // Streams shorter than the prebuffer still get played out.
        if !playing && received > 0 {
            self.start_playing();
        }

        Ok(received)
    }

    fn start_playing(&self) {
        self.sink.emit(EngineEvent::Ready);
        self.sink.emit(EngineEvent::PlayingChanged(true));
    }

    fn on_metadata(&self, block: &str) {
        let Some(title) = icy::stream_title(block) else {
            debug!(block, "metadata block without StreamTitle");
            return;
        };

        let metadata = icy::parse_stream_title(title);
        if !metadata.is_empty() {
            self.sink.emit(EngineEvent::MetadataChanged(metadata));
        }
    }
}

fn header(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;

    impl EngineEventSink for NullSink {
        fn emit(&self, _event: EngineEvent) {}
    }

    #[tokio::test]
    async fn rejects_unsupported_urls() {
        let engine = HttpStreamEngine::new(HttpEngineConfig::default()).unwrap();

        let err = engine.open("not a url", Arc::new(NullSink)).err().unwrap();
        assert!(matches!(err, BridgeError::InvalidUri(_)));

        let err = engine
            .open("ftp://radio.example/live", Arc::new(NullSink))
            .err()
            .unwrap();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn requires_runtime() {
        let engine = HttpStreamEngine::new(HttpEngineConfig::default()).unwrap();
        let err = engine
            .open("http://radio.example/live", Arc::new(NullSink))
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }

    #[test]
    fn release_is_idempotent() {
        let mut handle = HttpStreamHandle {
            cancel: CancellationToken::new(),
        };
        handle.release();
        handle.release();
        assert!(handle.cancel.is_cancelled());
    }
}
