//! Model provisioning for the local agent stack.
//!
//! This crate makes sure the Ollama server backing the agent stack has a given
//! model installed: it probes the server, checks the installed inventory,
//! pulls the model when missing while following the streamed progress, and
//! re-checks the inventory afterwards.
//!
//! ```text
//! probe --> inventory --(present)--> Ready
//!               |
//!            (absent)
//!               v
//!             pull --(failed)--> PullFailed
//!               |
//!           (success)
//!               v
//!            verify --(missing)--> VerificationFailed
//!               |
//!               v
//!             Ready
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use agentstack_models::{ProvisionConfig, Provisioner};
//!
//! let config = ProvisionConfig::from_env()?;
//! let result = Provisioner::new(config)?.run().await;
//! std::process::exit(result.exit_code() as i32);
//! ```

mod client;
mod config;
mod endpoint;
mod error;
mod event;
mod inventory;
mod probe;
mod pull;
#[cfg(test)]
mod testing;
mod verify;
mod workflow;

pub use client::{InferenceApi, OllamaClient};
pub use config::{ProvisionConfig, ProvisionConfigBuilder};
pub use endpoint::Endpoint;
pub use error::ProvisionError;
pub use event::{short_digest, PullEvent};
pub use inventory::{has_model, ModelInventory, ModelRecord};
pub use probe::{probe, ProbeOutcome};
pub use pull::{consume, decode_stream, pull_model, PullOutcome, PullStream};
pub use verify::{verify, Verification};
pub use workflow::{Outcome, ProvisioningResult, Provisioner, WorkflowEvent};

/// Default Ollama server URL.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Port Ollama listens on when an endpoint names only a host.
pub const DEFAULT_PORT: u16 = 11434;

/// Default model the agent stack provisions (vision-capable).
pub const DEFAULT_MODEL: &str = "llava";
