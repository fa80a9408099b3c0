//! Search session controller
//!
//! [`SearchController`] owns the one current [`SessionState`], drives
//! searches against the answer service, and publishes every state change
//! through a watch channel. Consumers subscribe for updates or read the
//! current state directly; they never mutate it.
//!
//! Each search issue bumps a generation counter. Responses and frames
//! carrying a superseded generation are discarded and their stream is
//! dropped, so only the most recent request ever mutates state, no matter
//! how requests interleave.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::client::ApiClient;
use crate::api::sse::Frame;
use crate::api::types::{
    AnswerEndPayload, ChunkPayload, ErrorPayload, RuntimeLlmConfig, SearchMode, SearchRequest,
    SourcesPayload,
};
use crate::session::metrics::SearchMetrics;
use crate::session::persistence::PersistenceBridge;
use crate::session::state::SessionState;

/// Drives search sessions and owns their observable state.
pub struct SearchController {
    client: ApiClient,
    persistence: PersistenceBridge,
    state_tx: watch::Sender<SessionState>,
    generation: AtomicU64,
    max_sources: u32,
    language: String,
}

impl SearchController {
    /// Create a controller and hydrate the previous session snapshot.
    ///
    /// The restored state always starts settled: not loading, not
    /// streaming, no error.
    ///
    /// # Arguments
    ///
    /// * `client` - API client for the answer service
    /// * `persistence` - Snapshot bridge; failures inside it are best-effort
    /// * `max_sources` - Source count requested per search
    /// * `language` - Synthesis language hint sent on streaming requests
    pub fn new(
        client: ApiClient,
        persistence: PersistenceBridge,
        max_sources: u32,
        language: impl Into<String>,
    ) -> Self {
        let initial = persistence.hydrate();
        let (state_tx, _) = watch::channel(initial);

        Self {
            client,
            persistence,
            state_tx,
            generation: AtomicU64::new(0),
            max_sources,
            language: language.into(),
        }
    }

    /// Subscribe to state changes.
    ///
    /// The receiver is primed with the current state; dropping it is the
    /// unsubscribe. Receivers that fall behind see only the latest state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Run one search to its terminal state.
    ///
    /// A query that is empty after trimming is ignored entirely: no state
    /// change, no request. Otherwise the session enters loading with the
    /// previous answer and sources cleared, and settles as done or failed.
    /// All failures fold into [`SessionState::error`]; this method never
    /// returns an error.
    ///
    /// Concurrent invocations are safe: a later call supersedes an earlier
    /// in-flight one, whose remaining frames and response are discarded.
    ///
    /// # Arguments
    ///
    /// * `query` - Search query; leading/trailing whitespace is not trimmed
    ///   from the stored state, only used for the emptiness check
    /// * `mode` - Retrieval strategy
    /// * `streaming` - Consume an event stream instead of one JSON response
    /// * `llm_config` - Optional per-request LLM override, passed through
    pub async fn run_search(
        &self,
        query: &str,
        mode: SearchMode,
        streaming: bool,
        llm_config: Option<RuntimeLlmConfig>,
    ) {
        if query.trim().is_empty() {
            debug!("ignoring search with empty query");
            return;
        }

        let generation = self.next_generation();
        let metrics = SearchMetrics::new(mode, streaming);
        info!(%mode, streaming, generation, "starting search");

        self.update(|state| {
            state.query = query.to_string();
            state.mode = mode;
            state.answer.clear();
            state.sources.clear();
            state.related_queries.clear();
            state.loading = true;
            state.streaming = streaming;
            state.error = None;
        });

        if streaming {
            self.run_streaming(generation, query, mode, llm_config, &metrics)
                .await;
        } else {
            self.run_batch(generation, query, mode, llm_config, &metrics)
                .await;
        }
    }

    /// Return the session to its initial state and delete the snapshot.
    ///
    /// Any in-flight search is superseded and will not mutate state.
    pub fn reset(&self) {
        info!("resetting session");
        self.next_generation();
        self.state_tx.send_replace(SessionState::default());
        self.persistence.purge();
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Apply a mutation and mirror the result to storage.
    fn update(&self, mutate: impl FnOnce(&mut SessionState)) {
        self.state_tx.send_modify(mutate);
        let snapshot = self.state_tx.borrow().clone();
        self.persistence.persist(&snapshot);
    }

    async fn run_batch(
        &self,
        generation: u64,
        query: &str,
        mode: SearchMode,
        llm_config: Option<RuntimeLlmConfig>,
        metrics: &SearchMetrics,
    ) {
        let request = SearchRequest {
            query: query.to_string(),
            mode,
            max_sources: self.max_sources,
            language: None,
            stream: false,
            llm_config,
        };

        let result = self.client.search(&request).await;

        if !self.is_current(generation) {
            debug!(generation, "discarding superseded batch response");
            metrics.record_outcome("superseded");
            return;
        }

        match result {
            Ok(response) => {
                self.update(|state| {
                    state.answer = response.answer;
                    state.sources = response.sources;
                    state.related_queries = response.related_queries;
                    state.search_time = response.search_time;
                    state.model_used = response.model_used;
                    state.loading = false;
                });
                metrics.record_outcome("done");
                info!(elapsed = ?metrics.elapsed(), "batch search complete");
            }
            Err(err) => {
                warn!(error = %err, "batch search failed");
                self.update(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
                metrics.record_outcome("error");
            }
        }
    }

    async fn run_streaming(
        &self,
        generation: u64,
        query: &str,
        mode: SearchMode,
        llm_config: Option<RuntimeLlmConfig>,
        metrics: &SearchMetrics,
    ) {
        let request = SearchRequest {
            query: query.to_string(),
            mode,
            max_sources: self.max_sources,
            language: Some(self.language.clone()),
            stream: true,
            llm_config,
        };

        let mut stream = match self.client.search_stream(&request).await {
            Ok(stream) => stream,
            Err(err) => {
                if !self.is_current(generation) {
                    metrics.record_outcome("superseded");
                    return;
                }
                warn!(error = %err, "streaming search failed to start");
                self.update(|state| {
                    state.loading = false;
                    state.streaming = false;
                    state.error = Some(err.to_string());
                });
                metrics.record_outcome("error");
                return;
            }
        };

        while let Some(result) = stream.next_frame().await {
            if !self.is_current(generation) {
                // Dropping the stream releases the connection.
                debug!(generation, "abandoning superseded stream");
                metrics.record_outcome("superseded");
                return;
            }

            match result {
                Ok(frame) => {
                    metrics.record_frame(&frame.event);
                    if self.apply_frame(&frame) {
                        let outcome = if frame.event == "error" { "error" } else { "done" };
                        metrics.record_outcome(outcome);
                        info!(elapsed = ?metrics.elapsed(), outcome, "stream finished");
                        return;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "stream transport failure");
                    self.update(|state| {
                        state.loading = false;
                        state.streaming = false;
                        state.error = Some(err.to_string());
                    });
                    metrics.record_outcome("error");
                    return;
                }
            }
        }

        // Stream ended without a terminal frame: settle gracefully with
        // whatever accumulated.
        if self.is_current(generation) {
            debug!("stream ended without terminal frame");
            self.update(|state| {
                state.loading = false;
                state.streaming = false;
            });
            metrics.record_outcome("done");
        } else {
            metrics.record_outcome("superseded");
        }
    }

    /// Apply one frame to the state. Returns true for terminal frames.
    ///
    /// Unknown events are ignored. A payload that is not a JSON object
    /// (the decoder's raw-string fallback) behaves as if every field were
    /// absent.
    fn apply_frame(&self, frame: &Frame) -> bool {
        match frame.event.as_str() {
            "sources" => {
                let payload: SourcesPayload =
                    serde_json::from_value(frame.data.clone()).unwrap_or_default();
                self.update(|state| {
                    state.sources = payload.items.unwrap_or_default();
                });
                false
            }
            "answer_chunk" => {
                let payload: ChunkPayload =
                    serde_json::from_value(frame.data.clone()).unwrap_or_default();
                let chunk = payload.chunk.unwrap_or_default();
                self.update(|state| {
                    state.answer.push_str(&chunk);
                });
                false
            }
            "answer_end" => {
                let payload: AnswerEndPayload =
                    serde_json::from_value(frame.data.clone()).unwrap_or_default();
                self.update(|state| {
                    // A non-empty final answer wins over the accumulation;
                    // an absent or empty one keeps what streamed in.
                    if let Some(answer) = payload.answer.filter(|a| !a.is_empty()) {
                        state.answer = answer;
                    }
                    // A present source list replaces, even when empty.
                    if let Some(sources) = payload.sources {
                        state.sources = sources;
                    }
                    state.related_queries = payload.related_queries.unwrap_or_default();
                    state.search_time = payload.search_time.unwrap_or(0.0);
                    state.model_used = payload.model_used.unwrap_or_default();
                    state.loading = false;
                    state.streaming = false;
                });
                true
            }
            "error" => {
                let payload: ErrorPayload =
                    serde_json::from_value(frame.data.clone()).unwrap_or_default();
                let message = payload
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Streaming failed".to_string());
                self.update(|state| {
                    state.loading = false;
                    state.streaming = false;
                    state.error = Some(message);
                });
                true
            }
            other => {
                debug!(event = other, "ignoring unknown frame event");
                false
            }
        }
    }
}
