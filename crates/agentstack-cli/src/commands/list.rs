//! List command - show installed models.

use std::process::ExitCode;

use agentstack_models::{InferenceApi, OllamaClient, ProvisionConfig};
use indicatif::HumanBytes;

pub(crate) async fn run(config: &ProvisionConfig) -> miette::Result<ExitCode> {
    let client = OllamaClient::from_config(config).map_err(|e| miette::miette!("{}", e))?;
    let inventory = client
        .list_models()
        .await
        .map_err(|e| miette::miette!("Failed to list models: {}", e))?;

    if inventory.is_empty() {
        println!("No models installed on {}.", config.endpoint);
        println!();
        println!("To install the default model, run:");
        println!("  agentstack provision");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Installed models on {}:", config.endpoint);
    for model in inventory.records() {
        match model.size {
            Some(size) => println!("  - {:<40} {}", model.name, HumanBytes(size)),
            None => println!("  - {}", model.name),
        }
    }

    Ok(ExitCode::SUCCESS)
}
