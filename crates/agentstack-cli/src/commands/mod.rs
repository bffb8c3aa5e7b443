//! CLI commands.

pub mod info;
pub mod list;
mod progress;
pub mod provision;
pub mod pull;
pub mod status;
