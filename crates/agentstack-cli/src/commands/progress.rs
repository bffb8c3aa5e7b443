//! Live pull progress display.

use agentstack_models::{short_digest, PullEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Renders pull events: one progress bar per layer, plain lines otherwise.
pub(crate) struct PullProgress {
    bar: Option<ProgressBar>,
    layer: Option<String>,
}

impl PullProgress {
    pub(crate) fn new() -> Self {
        Self {
            bar: None,
            layer: None,
        }
    }

    pub(crate) fn handle(&mut self, event: &PullEvent) {
        match event {
            PullEvent::Downloading {
                digest,
                total,
                completed,
            } => {
                let layer = digest.as_deref().map(short_digest).unwrap_or("layer");
                if self.layer.as_deref() != Some(layer) {
                    self.finish_bar();
                    self.layer = Some(layer.to_string());
                    self.bar = Some(new_bar(layer, *total));
                }
                if let Some(bar) = &self.bar {
                    if let Some(total) = total {
                        bar.set_length(*total);
                    }
                    if let Some(completed) = completed {
                        bar.set_position(*completed);
                    }
                }
            }
            PullEvent::Success => {
                self.finish_bar();
                println!("  success");
            }
            other => {
                self.finish_bar();
                println!("  {}", other.describe());
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        self.finish_bar();
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
        self.layer = None;
    }
}

fn new_bar(layer: &str, total: Option<u64>) -> ProgressBar {
    match total {
        Some(size) => {
            let bar = ProgressBar::new(size);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );
            bar.set_message(format!("downloading {}", layer));
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner:.green} {msg} {bytes}")
                    .expect("Invalid progress bar template"),
            );
            bar.set_message(format!("downloading {}", layer));
            bar
        }
    }
}
