//! Interactive search session.
//!
//! A readline loop over one long-lived session controller. Plain input
//! runs a search; slash commands adjust the session (mode, transport),
//! inspect sources, hand papers to the reader, or clear state. The
//! previous session is restored from storage on startup.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::api::SearchMode;
use crate::commands::{open_state_store, print_search_result, print_sources_table, run_and_render};
use crate::config::Config;
use crate::error::Result;
use crate::llm_store::RuntimeLlmStore;
use crate::reader::ReaderHandoff;
use crate::session::{PersistenceBridge, SearchController};

/// Session commands recognized inside the readline loop.
#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    /// Switch the search mode for subsequent queries
    SwitchMode(String),
    /// Disable streaming for subsequent queries
    Batch,
    /// Enable streaming for subsequent queries
    Stream,
    /// Re-print the sources of the last search
    Sources,
    /// Hand the Nth source of the last search to the reader
    Save(Option<usize>),
    /// Clear session state, persisted snapshot included
    Reset,
    /// Show available commands
    Help,
    /// Leave the session
    Exit,
    /// Unrecognized slash command
    Unknown(String),
    /// Not a command; treat as a query
    None,
}

fn parse_repl_command(input: &str) -> ReplCommand {
    if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        return ReplCommand::Exit;
    }
    if !input.starts_with('/') {
        return ReplCommand::None;
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match head {
        "/mode" => ReplCommand::SwitchMode(rest.to_string()),
        "/batch" => ReplCommand::Batch,
        "/stream" => ReplCommand::Stream,
        "/sources" => ReplCommand::Sources,
        "/save" => ReplCommand::Save(rest.parse().ok()),
        "/reset" => ReplCommand::Reset,
        "/help" => ReplCommand::Help,
        "/quit" => ReplCommand::Exit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

/// Start an interactive search session
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
pub async fn run_interactive(config: Config) -> Result<()> {
    let store = open_state_store(&config)?;
    let client = crate::api::ApiClient::new(&config.api.base_url, config.api.timeout_seconds)?;
    let controller = SearchController::new(
        client,
        PersistenceBridge::new(store.clone()),
        config.search.max_sources,
        config.search.language.clone(),
    );
    let handoff = ReaderHandoff::new(store);

    let llm_config = match RuntimeLlmStore::new().load() {
        Ok(stored) => stored.filter(|c| c.is_configured()),
        Err(e) => {
            tracing::warn!("Failed to load LLM override: {}", e);
            None
        }
    };

    let mut mode = config.search.mode;
    let mut streaming = config.search.streaming;

    let mut rl = DefaultEditor::new()?;

    print_welcome_banner(mode, streaming, llm_config.as_ref().and_then(|c| c.model.as_deref()));

    let restored = controller.state();
    if !restored.query.is_empty() {
        println!(
            "{}",
            format!("Restored last session: \"{}\"", restored.query).cyan()
        );
        println!();
    }

    loop {
        let prompt = format_prompt(mode, streaming);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_repl_command(trimmed) {
                    ReplCommand::SwitchMode(raw) => {
                        if raw.is_empty() {
                            println!(
                                "Current mode: {}. Usage: /mode <{}>\n",
                                mode,
                                SearchMode::NAMES.join("|")
                            );
                            continue;
                        }
                        match raw.parse::<SearchMode>() {
                            Ok(new_mode) => {
                                mode = new_mode;
                                println!("Mode set to {}\n", mode);
                            }
                            Err(e) => println!("{}\n", e.yellow()),
                        }
                        continue;
                    }
                    ReplCommand::Batch => {
                        streaming = false;
                        println!("Streaming disabled\n");
                        continue;
                    }
                    ReplCommand::Stream => {
                        streaming = true;
                        println!("Streaming enabled\n");
                        continue;
                    }
                    ReplCommand::Sources => {
                        let state = controller.state();
                        if state.sources.is_empty() {
                            println!("No sources yet\n");
                        } else {
                            print_sources_table(&state.sources);
                        }
                        continue;
                    }
                    ReplCommand::Save(index) => {
                        handle_save(&controller, &handoff, index);
                        continue;
                    }
                    ReplCommand::Reset => {
                        controller.reset();
                        println!("Session cleared\n");
                        continue;
                    }
                    ReplCommand::Help => {
                        print_help();
                        continue;
                    }
                    ReplCommand::Exit => break,
                    ReplCommand::Unknown(cmd) => {
                        println!(
                            "{}\n",
                            format!("Unknown command: {}. Type /help for commands.", cmd).yellow()
                        );
                        continue;
                    }
                    ReplCommand::None => {
                        // Regular search query
                    }
                }

                rl.add_history_entry(trimmed)?;

                println!();
                let state =
                    run_and_render(&controller, trimmed, mode, streaming, llm_config.clone())
                        .await;

                if let Some(error) = &state.error {
                    println!("{}\n", format!("Search failed: {}", error).red());
                    continue;
                }

                print_search_result(&state);
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn handle_save(controller: &SearchController, handoff: &ReaderHandoff, index: Option<usize>) {
    let index = match index {
        Some(index) => index,
        None => {
            println!("Usage: /save <n>\n");
            return;
        }
    };

    let state = controller.state();
    match index.checked_sub(1).and_then(|i| state.sources.get(i)) {
        Some(source) => {
            let id = handoff.save(source);
            println!("{}\n", format!("Saved for reader: {}", id).green());
        }
        None => {
            println!(
                "{}\n",
                format!("No source {} ({} available)", index, state.sources.len()).yellow()
            );
        }
    }
}

fn format_prompt(mode: SearchMode, streaming: bool) -> String {
    let tag = if streaming {
        format!("[{}]", mode)
    } else {
        format!("[{} batch]", mode)
    };
    format!("{} ", tag.cyan())
}

/// Display welcome banner at the start of an interactive session
///
/// Shows the current mode and transport plus basic instructions.
fn print_welcome_banner(mode: SearchMode, streaming: bool, llm_model: Option<&str>) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                autosearch Interactive Session                ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!(
        "Mode:      {} ({})",
        mode,
        if streaming { "streaming" } else { "batch" }
    );
    if let Some(model) = llm_model {
        println!("LLM:       {} (override)", model);
    }
    println!("\nType '/help' for available commands, 'exit' to quit\n");
}

fn print_help() {
    println!("\nAvailable commands:");
    println!("  /mode <m>   Switch search mode ({})", SearchMode::NAMES.join(", "));
    println!("  /batch      Fetch whole answers in one response");
    println!("  /stream     Stream answers as they are written");
    println!("  /sources    Show the sources of the last search");
    println!("  /save <n>   Hand the nth source to the reader");
    println!("  /reset      Clear the session, stored snapshot included");
    println!("  /help       Show this help");
    println!("  /quit       Leave the session\n");
    println!("Anything else runs as a search query.\n");
}
