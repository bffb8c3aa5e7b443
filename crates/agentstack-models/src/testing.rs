//! In-process inference server double for unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream::{self, Stream};

use crate::client::InferenceApi;
use crate::endpoint::Endpoint;
use crate::error::ProvisionError;
use crate::inventory::ModelInventory;
use crate::pull::{decode_stream, PullStream};

/// Raw body chunks as a stream.
pub(crate) fn chunks(items: Vec<io::Result<Vec<u8>>>) -> impl Stream<Item = io::Result<Vec<u8>>> {
    stream::iter(items)
}

/// A pull stream that delivers each line as its own chunk.
pub(crate) fn lines_stream(lines: &[&str]) -> PullStream {
    decode_stream(chunks(
        lines
            .iter()
            .map(|line| Ok(format!("{}\n", line).into_bytes()))
            .collect(),
    ))
}

pub(crate) struct FakeServer {
    endpoint: Endpoint,
    /// Failed status checks before the server comes up; `None` means never.
    failures_before_up: Option<u32>,
    /// Successive tags answers; the last one repeats.
    inventories: Mutex<VecDeque<Vec<String>>>,
    inventory_error: Option<String>,
    pull_response: Result<Vec<String>, String>,
    status_calls: AtomicU32,
    list_calls: AtomicU32,
    pull_calls: AtomicU32,
}

impl FakeServer {
    fn build(failures_before_up: Option<u32>, inventories: Vec<Vec<&str>>) -> Self {
        Self {
            endpoint: Endpoint::parse("http://fake-ollama:11434").expect("valid test endpoint"),
            failures_before_up,
            inventories: Mutex::new(
                inventories
                    .into_iter()
                    .map(|names| names.into_iter().map(String::from).collect())
                    .collect(),
            ),
            inventory_error: None,
            pull_response: Ok(Vec::new()),
            status_calls: AtomicU32::new(0),
            list_calls: AtomicU32::new(0),
            pull_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn unreachable() -> Self {
        Self::build(None, vec![vec![]])
    }

    pub(crate) fn reachable(inventories: Vec<Vec<&str>>) -> Self {
        Self::build(Some(0), inventories)
    }

    pub(crate) fn flaky(failures: u32, inventories: Vec<Vec<&str>>) -> Self {
        Self::build(Some(failures), inventories)
    }

    pub(crate) fn with_pull_lines(mut self, lines: &[&str]) -> Self {
        self.pull_response = Ok(lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub(crate) fn with_pull_error(mut self, message: &str) -> Self {
        self.pull_response = Err(message.to_string());
        self
    }

    pub(crate) fn with_inventory_error(mut self, message: &str) -> Self {
        self.inventory_error = Some(message.to_string());
        self
    }

    pub(crate) fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn pull_calls(&self) -> u32 {
        self.pull_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceApi for FakeServer {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn check_status(&self) -> Result<(), ProvisionError> {
        let attempt = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.failures_before_up {
            Some(failures) if attempt > failures => Ok(()),
            _ => Err(ProvisionError::Connection {
                endpoint: self.endpoint.to_string(),
                message: format!("connection refused (attempt {})", attempt),
            }),
        }
    }

    async fn list_models(&self) -> Result<ModelInventory, ProvisionError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.inventory_error {
            return Err(ProvisionError::InventoryQuery(message.clone()));
        }

        let mut inventories = self.inventories.lock().expect("inventory lock");
        let names = if inventories.len() > 1 {
            inventories.pop_front().unwrap_or_default()
        } else {
            inventories.front().cloned().unwrap_or_default()
        };
        Ok(ModelInventory::from_names(names))
    }

    async fn pull(&self, _name: &str) -> Result<PullStream, ProvisionError> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);
        match &self.pull_response {
            Ok(lines) => {
                let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
                Ok(lines_stream(&lines))
            }
            Err(message) => Err(ProvisionError::PullTransport(message.clone())),
        }
    }
}
