//! Post-pull verification.

use std::time::Duration;

use tracing::{info, warn};

use crate::client::InferenceApi;

/// Result of re-checking the inventory after a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Model present; carries every matching installed name.
    Verified(Vec<String>),
    /// Model still absent, or the inventory could not be read.
    NotFound(String),
}

/// Wait `settle_delay`, then confirm `name` is installed.
pub async fn verify(api: &dyn InferenceApi, name: &str, settle_delay: Duration) -> Verification {
    if !settle_delay.is_zero() {
        tokio::time::sleep(settle_delay).await;
    }

    let inventory = match api.list_models().await {
        Ok(inventory) => inventory,
        Err(e) => {
            warn!(model = %name, error = %e, "Could not re-read inventory after pull");
            return Verification::NotFound(e.to_string());
        }
    };

    let matches = inventory.matching_names(name);
    if matches.is_empty() {
        warn!(model = %name, installed = inventory.len(), "Model missing after pull");
        Verification::NotFound(format!(
            "'{}' is not among the {} installed model(s)",
            name,
            inventory.len()
        ))
    } else {
        info!(model = %name, variants = ?matches, "Model verified");
        Verification::Verified(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeServer;

    #[tokio::test]
    async fn test_verified() {
        let server = FakeServer::reachable(vec![vec!["llava:latest", "mistral:7b"]]);
        let result = verify(&server, "llava", Duration::ZERO).await;
        assert_eq!(result, Verification::Verified(vec!["llava:latest".to_string()]));
    }

    #[tokio::test]
    async fn test_not_found() {
        let server = FakeServer::reachable(vec![vec!["mistral:7b"]]);
        match verify(&server, "llava", Duration::ZERO).await {
            Verification::NotFound(detail) => assert!(detail.contains("'llava'")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_error_is_not_found() {
        let server = FakeServer::reachable(vec![vec![]]).with_inventory_error("bad json");
        match verify(&server, "llava", Duration::ZERO).await {
            Verification::NotFound(detail) => assert!(detail.contains("bad json")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
