//! Status command - probe the inference server.

use std::process::ExitCode;

use agentstack_models::{probe, OllamaClient, Outcome, ProbeOutcome, ProvisionConfig};

pub(crate) async fn run(config: &ProvisionConfig) -> miette::Result<ExitCode> {
    let client = OllamaClient::from_config(config).map_err(|e| miette::miette!("{}", e))?;

    match probe(&client, config.max_attempts, config.retry_delay).await {
        ProbeOutcome::Reachable { attempts } => {
            println!("Ollama is running at {} (attempt {})", config.endpoint, attempts);
            Ok(ExitCode::SUCCESS)
        }
        ProbeOutcome::Unreachable {
            attempts,
            last_error,
        } => {
            eprintln!(
                "Ollama is not reachable at {} after {} attempt(s)",
                config.endpoint, attempts
            );
            eprintln!("  {}", last_error);
            Ok(ExitCode::from(Outcome::ConnectionFailed.exit_code()))
        }
    }
}
