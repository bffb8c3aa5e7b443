//! Provision command - make sure the configured model is installed.

use std::process::ExitCode;

use agentstack_models::{Outcome, ProvisionConfig, Provisioner, WorkflowEvent};

use super::progress::PullProgress;

pub(crate) async fn run(config: ProvisionConfig) -> miette::Result<ExitCode> {
    let provisioner = Provisioner::new(config)
        .map_err(|e| miette::miette!("Failed to set up provisioning: {}", e))?;

    let model = provisioner.config().model.clone();
    println!(
        "Provisioning '{}' on {}",
        model,
        provisioner.config().endpoint
    );
    println!();

    let mut progress = PullProgress::new();
    let result = provisioner
        .run_with(|event| match event {
            WorkflowEvent::Probing { max_attempts } => {
                println!("Checking server (up to {} attempts)...", max_attempts);
            }
            WorkflowEvent::Reachable { attempts } => {
                println!("  Server reachable (attempt {})", attempts);
            }
            WorkflowEvent::AlreadyInstalled { variants } => {
                println!("Model already installed:");
                for name in &variants {
                    println!("  - {}", name);
                }
            }
            WorkflowEvent::Pulling { model } => {
                println!("Model '{}' not installed, pulling...", model);
                println!("This may take a while depending on your connection...");
            }
            WorkflowEvent::Pull(event) => progress.handle(&event),
            WorkflowEvent::Verifying => {
                progress.finish();
                println!("Verifying installation...");
            }
        })
        .await;
    progress.finish();

    println!();
    match result.outcome {
        Outcome::Ready => {
            println!("{}", result.detail);
            if result.pulled {
                for name in &result.variants {
                    println!("  - {}", name);
                }
            }
        }
        Outcome::ConnectionFailed => {
            eprintln!("Error: {}", result.detail);
            eprintln!("Is the Ollama container running? Start the stack and retry.");
        }
        Outcome::PullFailed => {
            eprintln!("Error: {}", result.detail);
            eprintln!("Re-run `agentstack provision {}` to try again.", model);
        }
        Outcome::VerificationFailed => {
            eprintln!("Error: {}", result.detail);
        }
    }

    Ok(ExitCode::from(result.exit_code()))
}
