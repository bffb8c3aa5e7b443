//! Pull orchestration: consume a streamed pull until `success` or failure.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::client::InferenceApi;
use crate::error::ProvisionError;
use crate::event::{LineBuffer, PullEvent};

/// Live, finite, single-use sequence of pull events.
///
/// A transport error is yielded once as `Err` and ends the stream.
pub type PullStream = BoxStream<'static, Result<PullEvent, ProvisionError>>;

/// How a pull ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    Succeeded,
    Failed(String),
}

impl PullOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PullOutcome::Succeeded)
    }
}

struct DecodeState<S> {
    body: Pin<Box<S>>,
    lines: LineBuffer,
    ready: VecDeque<PullEvent>,
    finished: bool,
}

impl<S> DecodeState<S> {
    fn queue(&mut self, line: &str) {
        if let Some(event) = PullEvent::decode(line) {
            self.ready.push_back(event);
        }
    }
}

/// Decode a newline-delimited JSON body into pull events as chunks arrive.
pub fn decode_stream<S, B, E>(body: S) -> PullStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        lines: LineBuffer::default(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for line in state.lines.push(chunk.as_ref()) {
                        state.queue(&line);
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    let message = e.to_string();
                    return Some((Err(ProvisionError::PullTransport(message)), state));
                }
                None => {
                    state.finished = true;
                    if let Some(rest) = state.lines.finish() {
                        state.queue(&rest);
                    }
                }
            }
        }
    })
    .boxed()
}

/// Consume `events` until a terminal condition, reporting each event to `on_event`.
///
/// Returns as soon as `success` arrives; anything after it is left unread.
pub async fn consume<F>(mut events: PullStream, mut on_event: F) -> PullOutcome
where
    F: FnMut(&PullEvent),
{
    let mut last_error: Option<String> = None;

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                on_event(&event);
                match event {
                    PullEvent::Success => return PullOutcome::Succeeded,
                    PullEvent::Error(message) => {
                        warn!(error = %message, "Server reported pull error");
                        last_error = Some(message);
                    }
                    other => debug!(status = %other.describe(), "Pull progress"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Pull stream broke");
                return PullOutcome::Failed(e.to_string());
            }
        }
    }

    PullOutcome::Failed(
        last_error.unwrap_or_else(|| "stream ended before reporting success".to_string()),
    )
}

/// Pull `name` through `api` and follow the stream to completion.
pub async fn pull_model<F>(api: &dyn InferenceApi, name: &str, on_event: F) -> PullOutcome
where
    F: FnMut(&PullEvent),
{
    info!(model = %name, endpoint = %api.endpoint(), "Pulling model");

    let events = match api.pull(name).await {
        Ok(events) => events,
        Err(e) => return PullOutcome::Failed(e.to_string()),
    };

    let outcome = consume(events, on_event).await;
    match &outcome {
        PullOutcome::Succeeded => info!(model = %name, "Pull reported success"),
        PullOutcome::Failed(reason) => warn!(model = %name, reason = %reason, "Pull failed"),
    }
    outcome
}
