//! Transports that open a progress stream.
//!
//! [`EventSource`] is the seam between the channel and the network: the
//! channel only needs a stream of raw byte chunks for a URL. The production
//! implementation is [`HttpEventSource`]; tests substitute scripted sources.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::{debug, instrument};

use super::error::StreamError;
use crate::api::ClientConfig;

/// Raw response body chunks of an open stream.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, StreamError>>;

/// Opens server-push connections.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Opens a connection to `url` and returns its body as a chunk stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] when the connection cannot be established.
    async fn open(&self, url: &str) -> Result<ByteStream, StreamError>;
}

/// `text/event-stream` over HTTP using reqwest.
///
/// Uses its own client without a whole-request timeout, since progress
/// streams stay open for as long as the import runs.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
}

impl HttpEventSource {
    /// Builds a source with the connect timeout and User-Agent of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, StreamError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StreamError::Client {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    #[instrument(skip(self))]
    async fn open(&self, url: &str) -> Result<ByteStream, StreamError> {
        let parsed = url::Url::parse(url).map_err(|_| StreamError::InvalidUrl {
            url: url.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|source| StreamError::Connect {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(status = status.as_u16(), "progress stream opened");

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(StreamError::transport))
            .boxed())
    }
}
