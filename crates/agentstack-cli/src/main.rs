//! agentstack CLI - provision models on the agent stack's Ollama server.

use std::process::ExitCode;

use agentstack_models::{Endpoint, ProvisionConfig, ProvisionConfigBuilder};
use clap::{Parser, Subcommand};

mod commands;

/// agentstack - keep the agent stack's inference server stocked with models
#[derive(Parser)]
#[command(name = "agentstack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ollama server URL (default: $AGENTSTACK_OLLAMA_URL or http://localhost:11434)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Connection attempts before giving up
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// Seconds to wait between connection attempts
    #[arg(long, global = true)]
    retry_delay: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make sure a model is installed, pulling it if needed
    Provision {
        /// Model name or prefix (default: $AGENTSTACK_MODEL or llava)
        model: Option<String>,
    },

    /// Check whether the Ollama server is reachable
    Status,

    /// List installed models
    List,

    /// Pull a model without checking the inventory first
    Pull {
        /// Model name
        model: String,
    },

    /// Show the effective configuration
    Info,
}

fn main() -> miette::Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let config = load_config(&cli)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?;

    match cli.command {
        Commands::Provision { model } => {
            let config = match model {
                Some(model) => ProvisionConfigBuilder::from_config(config).model(model).build(),
                None => config,
            };
            runtime.block_on(commands::provision::run(config))
        }
        Commands::Status => runtime.block_on(commands::status::run(&config)),
        Commands::List => runtime.block_on(commands::list::run(&config)),
        Commands::Pull { model } => runtime.block_on(commands::pull::run(&config, &model)),
        Commands::Info => commands::info::run(&config),
    }
}

/// Environment first, then command-line flags on top.
fn load_config(cli: &Cli) -> miette::Result<ProvisionConfig> {
    let config = ProvisionConfig::from_env().map_err(|e| miette::miette!("{}", e))?;
    let mut builder = ProvisionConfigBuilder::from_config(config);

    if let Some(url) = &cli.url {
        let endpoint = Endpoint::parse(url).map_err(|e| miette::miette!("{}", e))?;
        builder = builder.endpoint(endpoint);
    }
    if let Some(attempts) = cli.attempts {
        builder = builder.max_attempts(attempts);
    }
    if let Some(secs) = cli.retry_delay {
        builder = builder.retry_delay(std::time::Duration::from_secs(secs));
    }

    Ok(builder.build())
}
