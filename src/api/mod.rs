//! Answer-service API surface
//!
//! Everything that talks to the remote search service lives here.
//!
//! # Module Layout
//!
//! - `types`  -- Request/response payloads and streaming frame payloads
//! - `sse`    -- Incremental event-stream frame decoder
//! - `client` -- HTTP client and the lazy [`FrameStream`]

pub mod client;
pub mod sse;
pub mod types;

pub use client::{ApiClient, FrameStream};
pub use sse::{Frame, FrameDecoder};
pub use types::{
    AnswerEndPayload, ChunkPayload, ErrorPayload, HealthResponse, RuntimeLlmConfig,
    SearchMode, SearchRequest, SearchResponse, Source, SourcesPayload, VerifyResponse,
};
