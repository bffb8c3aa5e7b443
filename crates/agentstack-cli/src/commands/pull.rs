//! Pull command - pull a model and follow its progress.

use std::process::ExitCode;

use agentstack_models::{
    consume, InferenceApi, OllamaClient, Outcome, ProvisionConfig, ProvisionError, PullOutcome,
};

use super::progress::PullProgress;

pub(crate) async fn run(config: &ProvisionConfig, model: &str) -> miette::Result<ExitCode> {
    let client = OllamaClient::from_config(config).map_err(|e| miette::miette!("{}", e))?;

    let outcome = match client.pull(model).await {
        Ok(events) => {
            println!("Pulling model: {}", model);
            println!("This may take a while depending on your connection...");
            println!();

            let mut progress = PullProgress::new();
            let outcome = consume(events, |event| progress.handle(event)).await;
            progress.finish();
            outcome
        }
        Err(e @ ProvisionError::InvalidModelName(_)) => {
            return Err(miette::miette!("{}", e));
        }
        Err(e) => PullOutcome::Failed(e.to_string()),
    };

    println!();
    match outcome {
        PullOutcome::Succeeded => {
            println!("Model '{}' pulled successfully!", model);
            Ok(ExitCode::SUCCESS)
        }
        PullOutcome::Failed(reason) => {
            eprintln!("Failed to pull model '{}': {}", model, reason);
            Ok(ExitCode::from(Outcome::PullFailed.exit_code()))
        }
    }
}
