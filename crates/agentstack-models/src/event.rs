//! Pull progress events and their line decoder.

use serde::Deserialize;
use tracing::warn;

/// One line of the pull stream as sent on the wire.
#[derive(Debug, Deserialize)]
struct RawPullLine {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// A decoded pull progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullEvent {
    PullingManifest,
    /// A layer transfer; `total`/`completed` are bytes.
    Downloading {
        digest: Option<String>,
        total: Option<u64>,
        completed: Option<u64>,
    },
    VerifyingDigest,
    WritingManifest,
    RemovingUnusedLayers,
    /// The only event that marks a finished pull.
    Success,
    /// The server reported an error in-band.
    Error(String),
    /// A status tag outside the known vocabulary.
    Other(String),
}

impl PullEvent {
    /// Decode one line. Blank or malformed lines yield `None`.
    pub fn decode(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let raw: RawPullLine = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, line = %line, "Ignoring malformed pull progress line");
                return None;
            }
        };

        if let Some(error) = raw.error {
            return Some(PullEvent::Error(error));
        }

        let status = match raw.status {
            Some(status) => status,
            None => {
                warn!(line = %line, "Ignoring pull progress line without status");
                return None;
            }
        };

        let event = match status.as_str() {
            "pulling manifest" => PullEvent::PullingManifest,
            "downloading" => PullEvent::Downloading {
                digest: raw.digest,
                total: raw.total,
                completed: raw.completed,
            },
            "verifying digest" | "verifying sha256 digest" => PullEvent::VerifyingDigest,
            "writing manifest" => PullEvent::WritingManifest,
            "removing unused layers" | "removing any unused layers" => {
                PullEvent::RemovingUnusedLayers
            }
            "success" => PullEvent::Success,
            // Layer transfers are reported as "pulling <digest>" by live servers
            other if other.starts_with("pulling ") => PullEvent::Downloading {
                digest: raw
                    .digest
                    .or_else(|| Some(other.trim_start_matches("pulling ").to_string())),
                total: raw.total,
                completed: raw.completed,
            },
            _ => PullEvent::Other(status),
        };

        Some(event)
    }

    /// Whether this event ends the pull successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, PullEvent::Success)
    }

    /// Short operator-facing description.
    pub fn describe(&self) -> String {
        match self {
            PullEvent::PullingManifest => "pulling manifest".to_string(),
            PullEvent::Downloading { digest, .. } => match digest {
                Some(digest) => format!("downloading {}", short_digest(digest)),
                None => "downloading".to_string(),
            },
            PullEvent::VerifyingDigest => "verifying digest".to_string(),
            PullEvent::WritingManifest => "writing manifest".to_string(),
            PullEvent::RemovingUnusedLayers => "removing unused layers".to_string(),
            PullEvent::Success => "success".to_string(),
            PullEvent::Error(message) => format!("error: {}", message),
            PullEvent::Other(status) => status.clone(),
        }
    }
}

/// Truncate a content digest for display: `sha256:` prefix dropped, 12 chars kept.
pub fn short_digest(digest: &str) -> &str {
    let hex = digest.strip_prefix("sha256:").unwrap_or(digest);
    match hex.char_indices().nth(12) {
        Some((idx, _)) => &hex[..idx],
        None => hex,
    }
}

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every completed line.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Whatever is left once the body ends without a final newline.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}
