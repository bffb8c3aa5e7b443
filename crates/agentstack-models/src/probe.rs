//! Reachability probe with bounded, constant-delay retries.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::client::InferenceApi;
use crate::error::ProvisionError;

/// Result of probing the inference server.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Server answered; `attempts` counts the successful one.
    Reachable { attempts: u32 },
    /// Every attempt failed.
    Unreachable {
        attempts: u32,
        last_error: ProvisionError,
    },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ProbeOutcome::Reachable { attempts } | ProbeOutcome::Unreachable { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Check the server up to `max_attempts` times, sleeping `delay` between attempts.
///
/// `max_attempts` of zero is treated as one. There is no sleep after the last
/// failed attempt.
pub async fn probe(api: &dyn InferenceApi, max_attempts: u32, delay: Duration) -> ProbeOutcome {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match api.check_status().await {
            Ok(()) => {
                debug!(endpoint = %api.endpoint(), attempt = attempt, "Server reachable");
                return ProbeOutcome::Reachable { attempts: attempt };
            }
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        endpoint = %api.endpoint(),
                        attempt = attempt,
                        error = %e,
                        "Server unreachable after max attempts"
                    );
                    return ProbeOutcome::Unreachable {
                        attempts: attempt,
                        last_error: e,
                    };
                }

                warn!(
                    endpoint = %api.endpoint(),
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Server not reachable, retrying"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
