//! Runtime LLM override management.
//!
//! The override lives in the system keyring and is attached to every
//! search request while configured. `set` merges with any stored value,
//! so fields can be updated one at a time.

use colored::Colorize;

use crate::api::{ApiClient, RuntimeLlmConfig};
use crate::config::Config;
use crate::error::{AutosearchError, Result};
use crate::llm_store::RuntimeLlmStore;

/// Store or update the LLM override
///
/// # Arguments
///
/// * `base_url` - Base URL of the OpenAI-compatible endpoint
/// * `model` - Model identifier
/// * `api_key` - API key for the endpoint
/// * `temperature` - Sampling temperature
/// * `max_tokens` - Maximum answer tokens
pub async fn set_override(
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
) -> Result<()> {
    if base_url.is_none()
        && model.is_none()
        && api_key.is_none()
        && temperature.is_none()
        && max_tokens.is_none()
    {
        return Err(AutosearchError::Config(
            "Nothing to set; provide at least one of --base-url, --model, --api-key, \
             --temperature, --max-tokens"
                .to_string(),
        )
        .into());
    }

    let store = RuntimeLlmStore::new();
    let mut config = store.load()?.unwrap_or_default();

    if base_url.is_some() {
        config.base_url = base_url;
    }
    if model.is_some() {
        config.model = model;
    }
    if api_key.is_some() {
        config.api_key = api_key;
    }
    if temperature.is_some() {
        config.temperature = temperature;
    }
    if max_tokens.is_some() {
        config.max_tokens = max_tokens;
    }

    store.save(&config)?;
    println!("{}", "LLM override saved".green());

    if !config.is_configured() {
        println!(
            "{}",
            "Note: the override is only sent once both --base-url and --model are set".yellow()
        );
    }

    Ok(())
}

/// Print the stored override with the API key redacted
pub async fn show_override() -> Result<()> {
    let store = RuntimeLlmStore::new();

    match store.load()? {
        Some(config) => {
            print_override(&config);
            Ok(())
        }
        None => {
            println!("No LLM override stored");
            Ok(())
        }
    }
}

/// Remove the stored override
pub async fn clear_override() -> Result<()> {
    RuntimeLlmStore::new().clear()?;
    println!("{}", "LLM override cleared".green());
    Ok(())
}

/// Ask the backend to verify the stored override
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
pub async fn verify_override(config: Config) -> Result<()> {
    let store = RuntimeLlmStore::new();
    let llm_config = store.load()?.filter(|c| c.is_configured()).ok_or_else(|| {
        AutosearchError::MissingCredentials(
            "no usable LLM override stored; run 'autosearch llm set' first".to_string(),
        )
    })?;

    let client = ApiClient::new(&config.api.base_url, config.api.timeout_seconds)?;
    let response = client.verify_llm(&llm_config).await?;

    if response.ok {
        println!(
            "{}",
            format!("LLM verified: {} ({})", response.model_used, response.message).green()
        );
        Ok(())
    } else {
        Err(AutosearchError::Api(format!("LLM verification failed: {}", response.message)).into())
    }
}

fn print_override(config: &RuntimeLlmConfig) {
    println!("base_url:    {}", config.base_url.as_deref().unwrap_or("-"));
    println!("model:       {}", config.model.as_deref().unwrap_or("-"));
    println!(
        "api_key:     {}",
        if config.api_key.is_some() { "(set)" } else { "-" }
    );
    match config.temperature {
        Some(t) => println!("temperature: {}", t),
        None => println!("temperature: -"),
    }
    match config.max_tokens {
        Some(n) => println!("max_tokens:  {}", n),
        None => println!("max_tokens:  -"),
    }

    if !config.is_configured() {
        println!(
            "{}",
            "\nIncomplete: the override is only sent once base_url and model are both set"
                .yellow()
        );
    }
}
