//! Integration tests for the search session against a mock backend.
//!
//! Exercises the full client path: request shaping, streaming frame
//! decoding, state transitions, and snapshot persistence, for both the
//! batch and streaming transports.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autosearch::api::{ApiClient, RuntimeLlmConfig, SearchMode};
use autosearch::session::{PersistenceBridge, SearchController, SessionState};
use autosearch::storage::StateStore;

mod common;

const SNAPSHOT_KEY: &str = "session:last-state:v1";

/// Matches requests whose JSON body does not contain the given top-level field.
struct LacksField(&'static str);

impl wiremock::Match for LacksField {
    fn matches(&self, request: &wiremock::Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .map(|body| body.get(self.0).is_none())
            .unwrap_or(false)
    }
}

fn controller_for(server_uri: &str, store: Arc<dyn StateStore>) -> SearchController {
    let client = ApiClient::new(server_uri, 5).expect("valid base url");
    SearchController::new(client, PersistenceBridge::new(store), 6, "en")
}

fn source_json(title: &str, url: &str) -> serde_json::Value {
    json!({ "title": title, "url": url, "snippet": "a snippet" })
}

fn sse_body(frames: &[(&str, serde_json::Value)]) -> String {
    frames
        .iter()
        .map(|(event, data)| format!("event: {}\ndata: {}\n\n", event, data))
        .collect()
}

fn persisted_snapshot(store: &Arc<dyn StateStore>) -> Option<SessionState> {
    let raw = store.get(SNAPSHOT_KEY).expect("store read failed")?;
    Some(serde_json::from_str(&raw).expect("snapshot must be valid JSON"))
}

#[tokio::test]
async fn test_batch_search_updates_state_and_persists() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({
            "query": "rust borrow checker",
            "mode": "quick",
            "max_sources": 6,
            "stream": false
        })))
        .and(LacksField("language"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "rust borrow checker",
            "answer": "The borrow checker enforces aliasing rules.",
            "sources": [source_json("The Rust Book", "https://doc.rust-lang.org/book/")],
            "related_queries": ["rust lifetimes"],
            "search_time": 1.25,
            "model_used": "qwen3:8b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store.clone());
    controller
        .run_search("rust borrow checker", SearchMode::Quick, false, None)
        .await;

    let state = controller.state();
    assert_eq!(state.query, "rust borrow checker");
    assert_eq!(state.answer, "The borrow checker enforces aliasing rules.");
    assert_eq!(state.sources.len(), 1);
    assert_eq!(state.sources[0].title, "The Rust Book");
    assert_eq!(state.related_queries, vec!["rust lifetimes".to_string()]);
    assert_eq!(state.search_time, 1.25);
    assert_eq!(state.model_used, "qwen3:8b");
    assert!(!state.loading);
    assert!(!state.streaming);
    assert!(state.error.is_none());

    let snapshot = persisted_snapshot(&store).expect("snapshot must exist");
    assert_eq!(snapshot.answer, state.answer);
    assert!(!snapshot.loading);
    assert!(!snapshot.streaming);
}

#[tokio::test]
async fn test_batch_search_failure_sets_error() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store);
    controller
        .run_search("does not matter", SearchMode::Quick, false, None)
        .await;

    let state = controller.state();
    assert_eq!(state.error.as_deref(), Some("Search request failed (503)"));
    assert!(state.answer.is_empty());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_batch_search_passes_llm_override() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({
            "llm_config": {
                "base_url": "http://localhost:11434/v1",
                "model": "llama3.2:latest"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "q",
            "answer": "a",
            "sources": [],
            "related_queries": [],
            "search_time": 0.1,
            "model_used": "llama3.2:latest"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let llm_config = RuntimeLlmConfig {
        base_url: Some("http://localhost:11434/v1".to_string()),
        model: Some("llama3.2:latest".to_string()),
        ..Default::default()
    };

    let controller = controller_for(&server.uri(), store);
    controller
        .run_search("q", SearchMode::Quick, false, Some(llm_config))
        .await;

    let state = controller.state();
    assert!(state.error.is_none());
    assert_eq!(state.model_used, "llama3.2:latest");
}

#[tokio::test]
async fn test_streaming_search_full_flow() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    let body = sse_body(&[
        (
            "sources",
            json!({ "items": [
                source_json("Attention Is All You Need", "https://arxiv.org/abs/1706.03762"),
                source_json("The Annotated Transformer", "https://nlp.seas.harvard.edu/"),
            ]}),
        ),
        ("answer_chunk", json!({ "chunk": "Transformers replace" })),
        ("answer_chunk", json!({ "chunk": " recurrence with attention." })),
        (
            "answer_end",
            json!({
                "answer": "",
                "sources": [
                    source_json("Attention Is All You Need", "https://arxiv.org/abs/1706.03762"),
                    source_json("The Annotated Transformer", "https://nlp.seas.harvard.edu/"),
                    source_json("BERT", "https://arxiv.org/abs/1810.04805"),
                ],
                "related_queries": ["self attention", "positional encoding"],
                "search_time": 3.5,
                "model_used": "qwen3:8b"
            }),
        ),
    ]);

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({
            "stream": true,
            "language": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store.clone());
    controller
        .run_search("what are transformers", SearchMode::Deep, true, None)
        .await;

    let state = controller.state();
    // The empty final answer keeps the accumulated chunks.
    assert_eq!(state.answer, "Transformers replace recurrence with attention.");
    // The final source list replaces the streamed one.
    assert_eq!(state.sources.len(), 3);
    assert_eq!(
        state.related_queries,
        vec!["self attention".to_string(), "positional encoding".to_string()]
    );
    assert_eq!(state.search_time, 3.5);
    assert_eq!(state.model_used, "qwen3:8b");
    assert!(!state.loading);
    assert!(!state.streaming);
    assert!(state.error.is_none());

    let snapshot = persisted_snapshot(&store).expect("snapshot must exist");
    assert_eq!(snapshot.answer, state.answer);
    assert!(!snapshot.streaming);
}

#[tokio::test]
async fn test_streaming_error_frame_keeps_partial_answer() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    let body = sse_body(&[
        ("answer_chunk", json!({ "chunk": "Partial" })),
        ("error", json!({ "message": "LLM backend unavailable" })),
    ]);

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store);
    controller
        .run_search("failing stream", SearchMode::Quick, true, None)
        .await;

    let state = controller.state();
    assert_eq!(state.error.as_deref(), Some("LLM backend unavailable"));
    assert_eq!(state.answer, "Partial");
    assert!(!state.loading);
    assert!(!state.streaming);
}

#[tokio::test]
async fn test_stream_without_terminal_frame_settles_gracefully() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    let body = sse_body(&[
        ("answer_chunk", json!({ "chunk": "Hello" })),
        ("answer_chunk", json!({ "chunk": " world" })),
    ]);

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store);
    controller
        .run_search("no terminal", SearchMode::Quick, true, None)
        .await;

    let state = controller.state();
    assert_eq!(state.answer, "Hello world");
    assert!(!state.loading);
    assert!(!state.streaming);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_session_restores_across_controllers() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "persistent query",
            "answer": "A durable answer.",
            "sources": [source_json("Somewhere", "https://example.com/")],
            "related_queries": [],
            "search_time": 0.5,
            "model_used": "qwen3:8b"
        })))
        .mount(&server)
        .await;

    {
        let controller = controller_for(&server.uri(), store.clone());
        controller
            .run_search("persistent query", SearchMode::Quick, false, None)
            .await;
    }

    // A fresh controller over the same store hydrates the last session.
    let restored = controller_for(&server.uri(), store);
    let state = restored.state();
    assert_eq!(state.query, "persistent query");
    assert_eq!(state.answer, "A durable answer.");
    assert_eq!(state.sources.len(), 1);
    assert!(!state.loading);
    assert!(!state.streaming);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_later_search_supersedes_earlier_one() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({ "query": "slow query" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "query": "slow query",
                    "answer": "slow answer",
                    "sources": [],
                    "related_queries": [],
                    "search_time": 9.0,
                    "model_used": "qwen3:8b"
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_partial_json(json!({ "query": "fast query" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "fast query",
            "answer": "fast answer",
            "sources": [],
            "related_queries": [],
            "search_time": 0.1,
            "model_used": "qwen3:8b"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Arc::new(controller_for(&server.uri(), store));

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .run_search("slow query", SearchMode::Quick, false, None)
                .await;
        })
    };

    // Let the slow search issue its request before superseding it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    controller
        .run_search("fast query", SearchMode::Quick, false, None)
        .await;
    slow.await.expect("slow search task panicked");

    // The slow response arrived last but belongs to a stale generation.
    let state = controller.state();
    assert_eq!(state.query, "fast query");
    assert_eq!(state.answer, "fast answer");
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_reset_clears_state_and_snapshot() {
    let server = MockServer::start().await;
    let (store, _tmp) = common::create_temp_store();

    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "q",
            "answer": "a",
            "sources": [],
            "related_queries": [],
            "search_time": 0.2,
            "model_used": "qwen3:8b"
        })))
        .mount(&server)
        .await;

    let controller = controller_for(&server.uri(), store.clone());
    controller.run_search("q", SearchMode::Quick, false, None).await;
    assert!(persisted_snapshot(&store).is_some());

    controller.reset();

    assert_eq!(controller.state(), SessionState::default());
    assert!(persisted_snapshot(&store).is_none());
}
