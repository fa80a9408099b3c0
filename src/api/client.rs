//! HTTP client for the answer service
//!
//! [`ApiClient`] wraps a single `reqwest::Client` and exposes the four
//! service endpoints: batch search, streaming search, runtime LLM
//! verification, and health. Streaming responses are surfaced as a
//! [`FrameStream`], a lazy pull over the response body.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;

use crate::api::sse::{Frame, FrameDecoder};
use crate::api::types::{
    HealthResponse, RuntimeLlmConfig, SearchRequest, SearchResponse, VerifyResponse,
};
use crate::error::{AutosearchError, Result};

/// Client for the answer service's HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service base URL, e.g. `http://localhost:8000`
    /// * `timeout_seconds` - Total per-request timeout, including body reads
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use autosearch::api::ApiClient;
    ///
    /// let client = ApiClient::new("http://localhost:8000", 120);
    /// assert!(client.is_ok());
    /// ```
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| {
            AutosearchError::Config(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("autosearch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AutosearchError::Api(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(base_url = %parsed, "initialized API client");

        Ok(Self {
            client,
            base_url: parsed.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Run a non-streaming search and return the complete response.
    ///
    /// The request is sent with `stream` forced to `false`. A non-success
    /// status maps to the error message `Search request failed (<status>)`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut request = request.clone();
        request.stream = false;

        tracing::debug!(query = %request.query, mode = %request.mode, "batch search");

        let response = self
            .client
            .post(self.endpoint("/api/search"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Search request failed ({})",
                status.as_u16()
            ));
        }

        Ok(response.json::<SearchResponse>().await?)
    }

    /// Start a streaming search and return the frame stream.
    ///
    /// The request is sent with `stream` forced to `true`. A non-success
    /// status maps to the error message `Streaming failed (<status>)`; the
    /// body is not consumed in that case.
    pub async fn search_stream(&self, request: &SearchRequest) -> Result<FrameStream> {
        let mut request = request.clone();
        request.stream = true;

        tracing::debug!(query = %request.query, mode = %request.mode, "streaming search");

        let response = self
            .client
            .post(self.endpoint("/api/search"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Streaming failed ({})", status.as_u16()));
        }

        Ok(FrameStream::new(response.bytes_stream().boxed()))
    }

    /// Verify a runtime LLM configuration against the service.
    pub async fn verify_llm(&self, config: &RuntimeLlmConfig) -> Result<VerifyResponse> {
        let response = self
            .client
            .post(self.endpoint("/api/llm/verify"))
            .json(config)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutosearchError::Api(format!(
                "Verify request failed ({})",
                status.as_u16()
            ))
            .into());
        }

        Ok(response.json::<VerifyResponse>().await?)
    }

    /// Fetch service health and readiness.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .client
            .get(self.endpoint("/api/health"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutosearchError::Api(format!(
                "Health request failed ({})",
                status.as_u16()
            ))
            .into());
        }

        Ok(response.json::<HealthResponse>().await?)
    }
}

/// Lazy, finite stream of decoded frames over one streaming response.
///
/// Frames come out strictly in arrival order. The stream is not
/// restartable: after the body ends or a transport error is surfaced,
/// every further call returns `None`. Dropping the stream drops the
/// response body, which releases the underlying connection, so a consumer
/// may stop early at any point.
pub struct FrameStream {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: FrameDecoder,
    ready: VecDeque<Frame>,
    done: bool,
}

impl FrameStream {
    fn new(body: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            body,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Pull the next frame.
    ///
    /// Returns `None` when the stream is exhausted. A transport failure
    /// mid-stream is returned once as `Err`; the stream then fuses. A
    /// truncated block at the end of the body is discarded, never emitted.
    pub async fn next_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Some(Ok(frame));
            }
            if self.done {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.decoder.feed(&chunk)),
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(AutosearchError::Stream(err.to_string()).into()));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("ready", &self.ready.len())
            .field("done", &self.done)
            .finish()
    }
}
