//! End-to-end provisioning: probe, inventory, pull, verify.

use std::fmt;

use tracing::{info, warn};

use crate::client::{InferenceApi, OllamaClient};
use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::event::PullEvent;
use crate::probe::{probe, ProbeOutcome};
use crate::pull::{pull_model, PullOutcome};
use crate::verify::{verify, Verification};

/// Terminal state of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ready,
    ConnectionFailed,
    PullFailed,
    VerificationFailed,
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Ready => 0,
            Outcome::ConnectionFailed => 3,
            Outcome::PullFailed => 4,
            Outcome::VerificationFailed => 5,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Ready => "ready",
            Outcome::ConnectionFailed => "connection failed",
            Outcome::PullFailed => "pull failed",
            Outcome::VerificationFailed => "verification failed",
        };
        f.write_str(label)
    }
}

/// The single result every run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub outcome: Outcome,
    /// Human-readable cause or summary
    pub detail: String,
    /// Installed names matching the model, when ready
    pub variants: Vec<String>,
    /// Whether this run issued a pull
    pub pulled: bool,
}

impl ProvisioningResult {
    fn ready(detail: String, variants: Vec<String>, pulled: bool) -> Self {
        Self {
            outcome: Outcome::Ready,
            detail,
            variants,
            pulled,
        }
    }

    fn failed(outcome: Outcome, detail: String, pulled: bool) -> Self {
        Self {
            outcome,
            detail,
            variants: Vec::new(),
            pulled,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.outcome == Outcome::Ready
    }

    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

/// Progress notifications emitted while a run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    Probing { max_attempts: u32 },
    Reachable { attempts: u32 },
    AlreadyInstalled { variants: Vec<String> },
    Pulling { model: String },
    Pull(PullEvent),
    Verifying,
}

/// Drives one provisioning run against an inference server.
pub struct Provisioner<A = OllamaClient> {
    api: A,
    config: ProvisionConfig,
}

impl Provisioner<OllamaClient> {
    /// Create a provisioner talking HTTP to `config.endpoint`.
    pub fn new(config: ProvisionConfig) -> Result<Self, ProvisionError> {
        config.validate()?;
        let api = OllamaClient::from_config(&config)?;
        Ok(Self { api, config })
    }
}

impl<A: InferenceApi> Provisioner<A> {
    /// Create a provisioner over any `InferenceApi`.
    pub fn with_api(api: A, config: ProvisionConfig) -> Result<Self, ProvisionError> {
        config.validate()?;
        Ok(Self { api, config })
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run without progress reporting.
    pub async fn run(&self) -> ProvisioningResult {
        self.run_with(|_| {}).await
    }

    /// Run, reporting progress to `observer`.
    pub async fn run_with<F>(&self, mut observer: F) -> ProvisioningResult
    where
        F: FnMut(WorkflowEvent),
    {
        let model = self.config.model.as_str();
        let endpoint = self.api.endpoint().to_string();
        info!(model = %model, endpoint = %endpoint, "Provisioning model");

        observer(WorkflowEvent::Probing {
            max_attempts: self.config.max_attempts,
        });
        match probe(&self.api, self.config.max_attempts, self.config.retry_delay).await {
            ProbeOutcome::Reachable { attempts } => {
                observer(WorkflowEvent::Reachable { attempts });
            }
            ProbeOutcome::Unreachable {
                attempts,
                last_error,
            } => {
                return ProvisioningResult::failed(
                    Outcome::ConnectionFailed,
                    format!(
                        "Inference server at {} unreachable after {} attempt(s): {}",
                        endpoint, attempts, last_error
                    ),
                    false,
                );
            }
        }

        let inventory = match self.api.list_models().await {
            Ok(inventory) => inventory,
            Err(e) => {
                warn!(error = %e, "Inventory query failed");
                return ProvisioningResult::failed(Outcome::ConnectionFailed, e.to_string(), false);
            }
        };

        let variants = inventory.matching_names(model);
        if !variants.is_empty() {
            info!(model = %model, variants = ?variants, "Model already installed");
            observer(WorkflowEvent::AlreadyInstalled {
                variants: variants.clone(),
            });
            return ProvisioningResult::ready(
                format!("Model '{}' is already installed", model),
                variants,
                false,
            );
        }

        observer(WorkflowEvent::Pulling {
            model: model.to_string(),
        });
        let outcome = pull_model(&self.api, model, |event| {
            observer(WorkflowEvent::Pull(event.clone()))
        })
        .await;

        if let PullOutcome::Failed(reason) = outcome {
            return ProvisioningResult::failed(
                Outcome::PullFailed,
                format!("Pull of '{}' failed: {}", model, reason),
                true,
            );
        }

        observer(WorkflowEvent::Verifying);
        match verify(&self.api, model, self.config.settle_delay).await {
            Verification::Verified(variants) => ProvisioningResult::ready(
                format!("Model '{}' pulled and verified", model),
                variants,
                true,
            ),
            Verification::NotFound(detail) => ProvisioningResult::failed(
                Outcome::VerificationFailed,
                format!("{}: {}", ProvisionError::VerificationGap(model.to_string()), detail),
                true,
            ),
        }
    }
}
