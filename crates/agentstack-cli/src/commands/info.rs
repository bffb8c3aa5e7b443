//! Info command - show the effective configuration.

use std::process::ExitCode;

use agentstack_models::ProvisionConfig;

pub(crate) fn run(config: &ProvisionConfig) -> miette::Result<ExitCode> {
    println!("agentstack model provisioning");
    println!("=============================");
    println!();
    println!("Version:          {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Ollama endpoint:  {}", config.endpoint);
    println!("Model:            {}", config.model);
    println!("Max attempts:     {}", config.max_attempts);
    println!("Retry delay:      {}s", config.retry_delay.as_secs());
    println!("Settle delay:     {}s", config.settle_delay.as_secs());
    println!("Pull timeout:     {}s", config.pull_timeout.as_secs());
    println!();

    println!("Environment overrides:");
    println!("  AGENTSTACK_OLLAMA_URL (or OLLAMA_HOST)");
    println!("  AGENTSTACK_MODEL");
    println!("  AGENTSTACK_MAX_ATTEMPTS");
    println!("  AGENTSTACK_RETRY_DELAY_SECS");
    println!("  AGENTSTACK_SETTLE_DELAY_SECS");
    println!("  AGENTSTACK_PULL_TIMEOUT_SECS");

    Ok(ExitCode::SUCCESS)
}
