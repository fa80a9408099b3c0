//! Command-line interface definition for autosearch
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for one-shot search, interactive sessions,
//! reader handoff, LLM overrides, and service health checks.

use clap::{Parser, Subcommand};

/// autosearch - Retrieval and synthesis search client
///
/// Run searches against an answer service, stream synthesized
/// answers with sources, and hand papers off to the reader.
#[derive(Parser, Debug, Clone)]
#[command(name = "autosearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/autosearch.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend API base URL
    #[arg(long, env = "AUTOSEARCH_API_BASE")]
    pub api_base: Option<String>,

    /// Override the state database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for autosearch
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a single search and print the answer
    Search {
        /// The search query
        query: String,

        /// Search mode (quick, deep, academic, arxiv)
        #[arg(short, long)]
        mode: Option<String>,

        /// Fetch the whole answer in one response instead of streaming
        #[arg(long)]
        batch: bool,

        /// Maximum number of sources to retrieve
        #[arg(long)]
        max_sources: Option<u32>,

        /// Save the Nth source (1-based) for the reader after the search
        #[arg(long, value_name = "N")]
        save: Option<usize>,
    },

    /// Start an interactive search session
    Interactive,

    /// Inspect papers saved for the reader
    Reader {
        /// Reader subcommand
        #[command(subcommand)]
        command: ReaderCommand,
    },

    /// Manage the runtime LLM override
    Llm {
        /// LLM subcommand
        #[command(subcommand)]
        command: LlmCommand,
    },

    /// Check backend service health
    Health,

    /// Clear the persisted session state
    Reset,
}

/// Reader handoff subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ReaderCommand {
    /// Show a saved paper (most recent when no id is given)
    Show {
        /// Reader state id
        id: Option<String>,
    },
}

/// Runtime LLM override subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum LlmCommand {
    /// Store an LLM override
    Set {
        /// Base URL of the OpenAI-compatible endpoint
        #[arg(long)]
        base_url: Option<String>,

        /// Model identifier
        #[arg(long)]
        model: Option<String>,

        /// API key for the endpoint
        #[arg(long)]
        api_key: Option<String>,

        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Maximum answer tokens
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Show the stored override (API key redacted)
    Show,

    /// Remove the stored override
    Clear,

    /// Ask the backend to verify the stored override
    Verify,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/autosearch.yaml".to_string()),
            verbose: false,
            api_base: None,
            storage_path: None,
            command: Commands::Health,
        }
    }
}
