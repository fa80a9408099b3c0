//! autosearch - Retrieval and synthesis search client library
//!
//! This library provides the core functionality for the autosearch client,
//! including the answer-service API client, the observable search session,
//! local state persistence, and the reader handoff.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: HTTP client, wire types, and the streaming frame decoder
//! - `session`: Observable search session state and its controller
//! - `storage`: Key-value state store backends
//! - `reader`: Handoff of saved papers to the reader view
//! - `llm_store`: Keyring-backed runtime LLM override
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use autosearch::api::{ApiClient, SearchMode};
//! use autosearch::session::{PersistenceBridge, SearchController};
//! use autosearch::storage::MemoryStateStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStateStore::new());
//!     let client = ApiClient::new("http://localhost:8000", 120)?;
//!     let controller =
//!         SearchController::new(client, PersistenceBridge::new(store), 6, "en");
//!
//!     controller
//!         .run_search("what is rust", SearchMode::Quick, true, None)
//!         .await;
//!     println!("{}", controller.state().answer);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod llm_store;
pub mod reader;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use api::{ApiClient, SearchMode};
pub use config::Config;
pub use error::{AutosearchError, Result};
pub use session::{SearchController, SessionState};
