//! One-shot search command.
//!
//! Runs a single search to its terminal state, printing the answer as it
//! streams, then the sources and related queries. With `--save N` the Nth
//! source is handed off to the reader afterwards.

use colored::Colorize;

use crate::commands::{open_state_store, print_search_result, resolve_mode, run_and_render};
use crate::config::Config;
use crate::error::{AutosearchError, Result};
use crate::llm_store::RuntimeLlmStore;
use crate::reader::ReaderHandoff;
use crate::session::{PersistenceBridge, SearchController};

/// Run a single search and print the result
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `query` - The search query
/// * `mode` - Optional mode override (quick, deep, academic, arxiv)
/// * `batch` - Fetch one JSON response instead of streaming
/// * `max_sources` - Optional override for the source count
/// * `save` - Optional 1-based source index to hand off to the reader
pub async fn run_search(
    config: Config,
    query: String,
    mode: Option<String>,
    batch: bool,
    max_sources: Option<u32>,
    save: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        return Err(AutosearchError::Config("Query cannot be empty".to_string()).into());
    }

    let mode = resolve_mode(mode.as_deref(), config.search.mode)?;
    let streaming = !batch && config.search.streaming;
    let max_sources = max_sources.unwrap_or(config.search.max_sources);

    let store = open_state_store(&config)?;
    let client = crate::api::ApiClient::new(&config.api.base_url, config.api.timeout_seconds)?;
    let controller = SearchController::new(
        client,
        PersistenceBridge::new(store.clone()),
        max_sources,
        config.search.language.clone(),
    );

    let llm_config = match RuntimeLlmStore::new().load() {
        Ok(stored) => stored.filter(|c| c.is_configured()),
        Err(e) => {
            tracing::warn!("Failed to load LLM override: {}", e);
            None
        }
    };
    if let Some(cfg) = &llm_config {
        let model = cfg.model.as_deref().unwrap_or("?");
        println!("{}", format!("Using LLM override: {}", model).cyan());
    }

    println!(
        "{}",
        format!(
            "Searching ({} mode{})...",
            mode,
            if streaming { ", streaming" } else { "" }
        )
        .cyan()
    );
    println!();

    let state = run_and_render(&controller, &query, mode, streaming, llm_config).await;

    if let Some(error) = state.error {
        return Err(AutosearchError::Api(error).into());
    }

    print_search_result(&state);

    if let Some(index) = save {
        let source = index
            .checked_sub(1)
            .and_then(|i| state.sources.get(i))
            .ok_or_else(|| {
                AutosearchError::Config(format!(
                    "--save index {} is out of range ({} sources)",
                    index,
                    state.sources.len()
                ))
            })?;
        let id = ReaderHandoff::new(store).save(source);
        println!("{}", format!("Saved for reader: {}", id).green());
    }

    Ok(())
}

/// Clear the persisted session snapshot
///
/// Reader records and the LLM override are left alone.
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
pub async fn run_reset(config: Config) -> Result<()> {
    let store = open_state_store(&config)?;
    PersistenceBridge::new(store).purge();
    println!("Session state cleared");
    Ok(())
}
