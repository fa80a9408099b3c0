//! autosearch - Retrieval and synthesis search client
//!
#![doc = "autosearch - Retrieval and synthesis search client"]
#![doc = "Main entry point for the autosearch CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autosearch::cli::{Cli, Commands, LlmCommand, ReaderCommand};
use autosearch::commands;
use autosearch::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI, mirror it into
    // AUTOSEARCH_STATE_DB so the store initializer picks it up no matter
    // how the store gets constructed.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("AUTOSEARCH_STATE_DB", db_path);
        tracing::info!("Using state DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/autosearch.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    autosearch::session::metrics::init_metrics_exporter();

    // Execute command
    match cli.command {
        Commands::Search {
            query,
            mode,
            batch,
            max_sources,
            save,
        } => {
            tracing::info!("Starting one-shot search");
            commands::search::run_search(config, query, mode, batch, max_sources, save).await?;
            Ok(())
        }
        Commands::Interactive => {
            tracing::info!("Starting interactive session");
            commands::interactive::run_interactive(config).await?;
            Ok(())
        }
        Commands::Reader { command } => {
            tracing::info!("Starting reader command");
            match command {
                ReaderCommand::Show { id } => {
                    commands::reader::show_paper(config, id).await?;
                    Ok(())
                }
            }
        }
        Commands::Llm { command } => {
            tracing::info!("Starting LLM override command");
            match command {
                LlmCommand::Set {
                    base_url,
                    model,
                    api_key,
                    temperature,
                    max_tokens,
                } => {
                    commands::llm::set_override(base_url, model, api_key, temperature, max_tokens)
                        .await?;
                    Ok(())
                }
                LlmCommand::Show => {
                    commands::llm::show_override().await?;
                    Ok(())
                }
                LlmCommand::Clear => {
                    commands::llm::clear_override().await?;
                    Ok(())
                }
                LlmCommand::Verify => {
                    commands::llm::verify_override(config).await?;
                    Ok(())
                }
            }
        }
        Commands::Health => {
            tracing::info!("Starting health check");
            commands::health::run_health(config).await?;
            Ok(())
        }
        Commands::Reset => {
            tracing::info!("Clearing persisted session state");
            commands::search::run_reset(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autosearch=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
