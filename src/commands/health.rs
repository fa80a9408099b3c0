//! Backend health check command.

use colored::Colorize;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;

/// Query and print backend service health
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
pub async fn run_health(config: Config) -> Result<()> {
    let client = ApiClient::new(&config.api.base_url, config.api.timeout_seconds)?;
    let health = client.health().await?;

    let status = if health.status == "healthy" {
        health.status.green()
    } else {
        health.status.yellow()
    };

    println!("Backend:        {}", config.api.base_url);
    println!("Status:         {}", status);
    println!("Version:        {}", health.version);
    println!("LLM connected:  {}", yes_no(health.llm_connected));
    println!("Reranker:       {}", yes_no(health.reranker_loaded));
    if !health.search_engines.is_empty() {
        println!("Engines:        {}", health.search_engines.join(", "));
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
