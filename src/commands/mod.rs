/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes one module per top-level command:

- `search`      — One-shot search with progressive answer output
- `interactive` — Readline-based search session
- `reader`      — Inspect papers saved for the reader
- `llm`         — Manage the runtime LLM override
- `health`      — Backend service health check

These handlers are intentionally small and use the library components:
the API client, the session controller, and the state store.
*/

use crate::api::types::Source;
use crate::api::{RuntimeLlmConfig, SearchMode};
use crate::config::Config;
use crate::error::{AutosearchError, Result};
use crate::session::{SearchController, SessionState};
use crate::storage::{SledStateStore, StateStore};
use std::io::Write;
use std::sync::Arc;

pub mod health;
pub mod interactive;
pub mod llm;
pub mod reader;
pub mod search;

/// Open the state store configured for this invocation.
pub(crate) fn open_state_store(config: &Config) -> Result<Arc<dyn StateStore>> {
    let store = match &config.storage.path {
        Some(path) => SledStateStore::new_with_path(path.clone())?,
        None => SledStateStore::new()?,
    };
    Ok(Arc::new(store))
}

/// Resolve a mode argument against the configured default.
pub(crate) fn resolve_mode(arg: Option<&str>, fallback: SearchMode) -> Result<SearchMode> {
    match arg {
        Some(raw) => raw
            .parse()
            .map_err(|e: String| AutosearchError::Config(e).into()),
        None => Ok(fallback),
    }
}

/// Run one search on the controller while printing answer text as it
/// arrives, and return the terminal state.
///
/// The caller must pass a non-empty query; an ignored search would leave
/// the renderer waiting for an update that never comes.
pub(crate) async fn run_and_render(
    controller: &SearchController,
    query: &str,
    mode: SearchMode,
    streaming: bool,
    llm_config: Option<RuntimeLlmConfig>,
) -> SessionState {
    let mut rx = controller.subscribe();
    rx.borrow_and_update();

    let render = tokio::spawn(async move {
        let mut shown = String::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if let Some(delta) = state.answer.strip_prefix(shown.as_str()) {
                if !delta.is_empty() {
                    print!("{}", delta);
                    let _ = std::io::stdout().flush();
                    shown = state.answer.clone();
                }
            } else if !state.answer.is_empty() {
                // The final frame rewrote the answer wholesale.
                println!();
                print!("{}", state.answer);
                let _ = std::io::stdout().flush();
                shown = state.answer.clone();
            }
            if !state.loading {
                break;
            }
        }
    });

    controller.run_search(query, mode, streaming, llm_config).await;
    let _ = render.await;
    controller.state()
}

/// Print the non-answer parts of a finished search: sources, related
/// queries, and the timing footer.
pub(crate) fn print_search_result(state: &SessionState) {
    use colored::Colorize;

    if !state.answer.is_empty() {
        println!();
    }

    if !state.sources.is_empty() {
        println!();
        print_sources_table(&state.sources);
    }

    if !state.related_queries.is_empty() {
        println!("Related queries:");
        for (i, query) in state.related_queries.iter().enumerate() {
            println!("  {}. {}", i + 1, query);
        }
        println!();
    }

    if state.search_time > 0.0 || !state.model_used.is_empty() {
        let mut footer = format!("Completed in {}", format_seconds(state.search_time));
        if !state.model_used.is_empty() {
            footer.push_str(&format!(" using {}", state.model_used));
        }
        println!("{}", footer.cyan());
    }
}

/// Print retrieved sources as a numbered table.
pub(crate) fn print_sources_table(sources: &[Source]) {
    use prettytable::{row, Table};

    let mut table = Table::new();
    table.add_row(row!["#", "Title", "Host", "Score"]);

    for (i, source) in sources.iter().enumerate() {
        let score = source
            .relevance_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(row![
            i + 1,
            truncate(&source.title, 60),
            format_host(&source.url),
            score
        ]);
    }

    table.printstd();
    println!();
}

/// Hostname of a URL with any `www.` prefix removed, for compact display.
///
/// Unparseable URLs come back unchanged.
pub(crate) fn format_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_else(|| url.to_string())
}

/// Seconds with one decimal, e.g. `2.4s`.
pub(crate) fn format_seconds(seconds: f64) -> String {
    format!("{:.1}s", seconds)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}
