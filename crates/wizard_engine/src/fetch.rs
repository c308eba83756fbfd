use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{FailureKind, FetchError, FetchSettings};

/// Receives a response body chunk by chunk. Returning an error stops the
/// fetch; a `Cancelled` error is how an abort reaches the fetcher.
pub trait ChunkSink: Send {
    fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), FetchError>;
}

/// The shared network transport. One instance serves every download.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Streams `url` into `sink` and returns the number of bytes written.
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, FetchError>;

    /// Closes the transport. Requests in flight fail fast with
    /// `TransportClosed`, and later requests fail immediately.
    fn close(&self);
}

/// `reqwest`-backed transport with an explicit close.
#[derive(Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    closed: CancellationToken,
}

impl ReqwestFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            closed: CancellationToken::new(),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, FetchError> {
        if self.is_closed() {
            return Err(transport_closed());
        }
        let parsed =
            Url::parse(url).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = tokio::select! {
            _ = self.closed.cancelled() => return Err(transport_closed()),
            response = self.client.get(parsed).send() => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                _ = self.closed.cancelled() => return Err(transport_closed()),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(map_reqwest_error)?;
            sink.write_chunk(&chunk)?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

fn transport_closed() -> FetchError {
    FetchError::new(FailureKind::TransportClosed, "network transport was closed")
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
